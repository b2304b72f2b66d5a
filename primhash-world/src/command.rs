/// Console commands understood by [`PrimitiveOctree::exec`](crate::octree::PrimitiveOctree::exec).
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum OctreeCommand {
    /// `SHOWOCTREE`: toggles drawing of node bounds.
    ToggleShow,
    /// `OCTREESTATS`: logs the statistics table.
    ShowStats,
    /// `OCTREESTATS RESET`: clears all statistics.
    ResetStats,
}

impl OctreeCommand {
    /// Parses a console command line.
    ///
    /// Returns [`None`] for commands that are meant for someone else.
    pub fn parse(mut command: &str) -> Option<Self> {
        if parse_word(&mut command, "SHOWOCTREE") {
            Some(Self::ToggleShow)
        } else if parse_word(&mut command, "OCTREESTATS") {
            if parse_word(&mut command, "RESET") {
                Some(Self::ResetStats)
            } else {
                Some(Self::ShowStats)
            }
        } else {
            None
        }
    }
}

/// Consumes `word` from the start of `input` if it is there as a whole word.
///
/// Leading whitespace is ignored and matching is case-insensitive. On success, whitespace following
/// the word is consumed as well.
pub fn parse_word(input: &mut &str, word: &str) -> bool {
    let trimmed = input.trim_start();
    let Some(head) = trimmed.get(..word.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(word) {
        return false;
    }

    let rest = &trimmed[word.len()..];
    if rest.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
        return false;
    }

    *input = rest.trim_start();
    true
}
