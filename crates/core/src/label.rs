use std::path::Path;

/// Label written at the head of a file's output line.
///
/// Submission files are named `[task][status]id.ext`; anything else is
/// labelled by its file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLabel {
    Submission {
        task: String,
        status: String,
        id: String,
    },
    Plain(String),
}

impl FileLabel {
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        parse_submission(&name).unwrap_or_else(|| {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or(name);
            FileLabel::Plain(stem)
        })
    }

    /// `task`, or `task|status|id` when `detailed`.
    pub fn render(&self, detailed: bool) -> String {
        let raw = match self {
            FileLabel::Submission { task, status, id } if detailed => {
                format!("{task}|{status}|{id}")
            }
            FileLabel::Submission { task, .. } => task.clone(),
            FileLabel::Plain(stem) => stem.clone(),
        };
        let label: String = raw
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        if label.is_empty() { "_".to_string() } else { label }
    }
}

fn parse_submission(name: &str) -> Option<FileLabel> {
    let rest = name.strip_prefix('[')?;
    let (task, rest) = rest.split_once(']')?;
    let rest = rest.strip_prefix('[')?;
    let (status, rest) = rest.split_once(']')?;
    let id = rest.split('.').next().unwrap_or(rest);
    Some(FileLabel::Submission {
        task: task.to_string(),
        status: status.to_string(),
        id: id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracketed_names_split_into_parts() {
        let label = FileLabel::from_path(Path::new("data/[1A][OK]12345.c"));
        assert_eq!(
            label,
            FileLabel::Submission {
                task: "1A".to_string(),
                status: "OK".to_string(),
                id: "12345".to_string(),
            }
        );
        assert_eq!(label.render(false), "1A");
        assert_eq!(label.render(true), "1A|OK|12345");
    }

    #[test]
    fn other_names_fall_back_to_stem() {
        let label = FileLabel::from_path(Path::new("src/main.cpp"));
        assert_eq!(label, FileLabel::Plain("main".to_string()));
        assert_eq!(label.render(true), "main");

        let half = FileLabel::from_path(Path::new("[task]rest.c"));
        assert_eq!(half.render(false), "[task]rest");
    }

    #[test]
    fn whitespace_never_reaches_the_label() {
        let label = FileLabel::from_path(Path::new("[two words][Wrong Answer]7.c"));
        assert_eq!(label.render(true), "two_words|Wrong_Answer|7");
    }
}
