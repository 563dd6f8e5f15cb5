use std::collections::HashSet;

/// Issues item ids unique for the lifetime of the generator.
///
/// An id is `<millis>-<random>-<os random>`, the last two in base 36.
/// Candidates already issued (or registered through [`exclude`](Self::exclude))
/// are rejected and regenerated. Ids are never released, so a removed
/// item's id is not handed out again.
#[derive(Debug, Default)]
pub struct IdGenerator {
    issued: HashSet<String>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark existing ids as taken.
    pub fn exclude<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.issued.extend(ids.into_iter().map(Into::into));
    }

    pub fn is_issued(&self, id: &str) -> bool {
        self.issued.contains(id)
    }

    pub fn generate(&mut self) -> String {
        loop {
            let candidate = format!(
                "{}-{}-{}",
                chrono::Utc::now().timestamp_millis(),
                to_base36(rand::random::<u64>()),
                to_base36(u64::from(os_random_u32())),
            );
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
            tracing::trace!(candidate = %candidate, "id collision, regenerating");
        }
    }
}

fn os_random_u32() -> u32 {
    let mut buf = [0u8; 4];
    match getrandom::fill(&mut buf) {
        Ok(()) => u32::from_le_bytes(buf),
        Err(e) => {
            tracing::warn!(error = %e, "OS random source unavailable, using thread rng");
            rand::random::<u32>()
        }
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_encodes_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn generated_ids_have_three_parts() {
        let mut ids = IdGenerator::new();
        let id = ids.generate();
        assert_eq!(id.split('-').count(), 3, "got: {id}");
        assert!(ids.is_issued(&id));
    }

    #[test]
    fn generated_ids_are_unique() {
        let mut ids = IdGenerator::new();
        let all: HashSet<String> = (0..1000).map(|_| ids.generate()).collect();
        assert_eq!(all.len(), 1000);
    }

    #[test]
    fn excluded_ids_count_as_issued() {
        let mut ids = IdGenerator::new();
        ids.exclude(["1-a-b"]);
        assert!(ids.is_issued("1-a-b"));
        assert_ne!(ids.generate(), "1-a-b");
    }
}
