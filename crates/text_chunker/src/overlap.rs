// src/overlap.rs

/// Picks the trailing units of a finalized chunk that are repeated at the
/// start of the next one.
///
/// Units are whole segments or words; they are never cut. Walking backwards
/// stops at the first unit that would push the overlap past the budget.
pub struct OverlapStrategy {
    budget: usize,
}

impl OverlapStrategy {
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    /// Trailing units whose combined size, as reported by `measure`, stays
    /// within the budget. Order is preserved.
    pub fn trailing<F>(&self, units: &[String], measure: F) -> Vec<String>
    where
        F: Fn(&[String]) -> usize,
    {
        let mut start = units.len();
        while start > 0 && measure(&units[start - 1..]) <= self.budget {
            start -= 1;
        }
        units[start..].to_vec()
    }

    /// The last `budget` units, whatever their size.
    pub fn trailing_count(&self, units: &[String]) -> Vec<String> {
        let start = units.len().saturating_sub(self.budget);
        units[start..].to_vec()
    }
}

/// Drop the oldest seeded units until `fits` accepts what is left.
///
/// Used after seeding so that overlap plus the incoming unit never breaks
/// the chunk limit. May empty the seed entirely.
pub fn shrink_to_fit<F>(seed: &mut Vec<String>, fits: F)
where
    F: Fn(&[String]) -> bool,
{
    let mut start = 0;
    while start < seed.len() && !fits(&seed[start..]) {
        start += 1;
    }
    seed.drain(..start);
}

/// Total character count across units.
pub fn char_len(units: &[String]) -> usize {
    units.iter().map(|u| u.chars().count()).sum()
}
