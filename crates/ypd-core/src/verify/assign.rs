//! Assignment of produced files to jobs.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::job::NamePattern;

/// File name -> index of the job it was attributed to.
pub type FileClaims = BTreeMap<String, usize>;

/// A finished media file: full name and matching key.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate<'a> {
    pub name: &'a str,
    pub key: &'a str,
}

#[derive(Debug, Default)]
pub(crate) struct Assignment {
    pub matched: Vec<bool>,
    /// Files attributed to placeholder jobs in this pass.
    pub claims: FileClaims,
}

/// Matches `patterns` (one per job) against `files`.
///
/// Literal keys match by equality and may share a file. Placeholder jobs are
/// grouped by identical pattern; groups with more literal text go first.
/// Within a group, a job first gets back a file `settled` attributes to it;
/// the rest need one distinct unattributed file each. When a group has fewer
/// such files than waiting members, none of them match and the files are
/// withheld from less specific groups.
pub(crate) fn assign(
    patterns: &[NamePattern],
    files: &[Candidate<'_>],
    settled: &FileClaims,
) -> Assignment {
    let mut matched = vec![false; patterns.len()];
    let mut taken = vec![false; files.len()];
    let mut claims = FileClaims::new();

    for (ji, pattern) in patterns.iter().enumerate().filter(|(_, p)| p.is_literal()) {
        for (fi, file) in files.iter().enumerate() {
            if pattern.matches(file.key) {
                matched[ji] = true;
                taken[fi] = true;
            }
        }
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (ji, pattern) in patterns.iter().enumerate().filter(|(_, p)| !p.is_literal()) {
        match groups.iter_mut().find(|g| patterns[g[0]] == *pattern) {
            Some(group) => group.push(ji),
            None => groups.push(vec![ji]),
        }
    }
    groups.sort_by_key(|g| (Reverse(patterns[g[0]].literal_len()), g[0]));

    for group in groups {
        let pattern = &patterns[group[0]];
        let candidates: Vec<usize> = (0..files.len())
            .filter(|&fi| !taken[fi] && pattern.matches(files[fi].key))
            .collect();

        let mut waiting = Vec::new();
        for &ji in &group {
            let own = candidates
                .iter()
                .copied()
                .find(|&fi| !taken[fi] && settled.get(files[fi].name) == Some(&ji));
            match own {
                Some(fi) => {
                    taken[fi] = true;
                    matched[ji] = true;
                    claims.insert(files[fi].name.to_string(), ji);
                }
                None => waiting.push(ji),
            }
        }

        let free: Vec<usize> = candidates
            .into_iter()
            .filter(|&fi| !taken[fi] && !settled.contains_key(files[fi].name))
            .collect();
        if free.len() < waiting.len() {
            tracing::debug!(
                jobs = waiting.len(),
                files = free.len(),
                "ambiguous name group; leaving every member unverified"
            );
            for fi in free {
                taken[fi] = true;
            }
            continue;
        }
        for (ji, fi) in waiting.into_iter().zip(free) {
            taken[fi] = true;
            matched[ji] = true;
            claims.insert(files[fi].name.to_string(), ji);
        }
    }

    Assignment { matched, claims }
}
