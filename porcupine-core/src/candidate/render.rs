//! Shrink tree rendering for debugging and visualization.

use super::Candidate;
use std::fmt::Debug;

impl<T> Candidate<T>
where
    T: Debug + 'static,
{
    /// Render the shrink tree down to `depth` levels, `width` children per node.
    ///
    /// Shrink sequences can be infinite, so both bounds are required.
    pub fn render(&self, depth: usize, width: usize) -> String {
        let mut result = String::new();
        self.render_recursive(&mut result, "", true, depth, width);
        result
    }

    fn render_recursive(
        &self,
        result: &mut String,
        prefix: &str,
        is_last: bool,
        depth: usize,
        width: usize,
    ) {
        result.push_str(prefix);
        if is_last {
            result.push_str("└── ");
        } else {
            result.push_str("├── ");
        }
        result.push_str(&format!("{:?} {}\n", self.value(), self.distance()));

        if depth == 0 {
            return;
        }

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        let children: Vec<Candidate<T>> = self.shrinks().take(width).collect();
        for (i, child) in children.iter().enumerate() {
            let child_is_last = i == children.len() - 1;
            child.render_recursive(result, &child_prefix, child_is_last, depth - 1, width);
        }
    }

    /// Render the first `width` shrinks on one line.
    pub fn render_shrinks(&self, width: usize) -> String {
        let shrinks: Vec<String> = self
            .shrinks()
            .take(width)
            .map(|c| format!("{:?}", c.value()))
            .collect();
        if shrinks.is_empty() {
            format!("{:?} (no shrinks)", self.value())
        } else {
            format!("{:?} → [{}]", self.value(), shrinks.join(", "))
        }
    }
}
