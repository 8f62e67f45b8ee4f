use std::collections::BTreeSet;

/// Character names bucketed by first letter, for cycling autocompletion.
#[derive(Clone, Debug, Default)]
pub struct NameIndex {
    a_to_m: BTreeSet<String>,
    n_to_z: BTreeSet<String>,
    other: BTreeSet<String>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.a_to_m.clear();
        self.n_to_z.clear();
        self.other.clear();
    }

    pub fn add(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        self.bucket_mut(name).insert(name.to_string());
    }

    pub fn len(&self) -> usize {
        self.a_to_m.len() + self.n_to_z.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Proposes the name following `current` among those starting with `prefix`.
    /// Falls back to the first match, or `current` when nothing matches.
    pub fn next_match(&self, current: &str, prefix: &str) -> String {
        if prefix.is_empty() {
            return current.to_string();
        }
        let proposals: Vec<&String> = self
            .bucket(prefix)
            .iter()
            .filter(|name| name.starts_with(prefix))
            .collect();
        let Some(first) = proposals.first() else {
            return current.to_string();
        };
        match proposals.iter().position(|name| name.as_str() == current) {
            Some(idx) => proposals[(idx + 1) % proposals.len()].to_string(),
            None => first.to_string(),
        }
    }

    fn bucket(&self, name: &str) -> &BTreeSet<String> {
        match bucket_key(name) {
            Bucket::AToM => &self.a_to_m,
            Bucket::NToZ => &self.n_to_z,
            Bucket::Other => &self.other,
        }
    }

    fn bucket_mut(&mut self, name: &str) -> &mut BTreeSet<String> {
        match bucket_key(name) {
            Bucket::AToM => &mut self.a_to_m,
            Bucket::NToZ => &mut self.n_to_z,
            Bucket::Other => &mut self.other,
        }
    }
}

enum Bucket {
    AToM,
    NToZ,
    Other,
}

fn bucket_key(name: &str) -> Bucket {
    match name.chars().next().map(|ch| ch.to_ascii_lowercase()) {
        Some('a'..='m') => Bucket::AToM,
        Some('n'..='z') => Bucket::NToZ,
        _ => Bucket::Other,
    }
}
