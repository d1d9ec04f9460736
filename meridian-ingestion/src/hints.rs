// ABOUTME: Rule-based entity hint extraction: clients/projects/requirements/tasks/team-members/technologies
// ABOUTME: Regex-based entity hints over raw text, returned as Vec<(kind, text)> pairs

use std::sync::LazyLock;

use regex::Regex;

static CLIENT_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mi)^\s*client:\s*(.+)$").unwrap());
static PROJECT_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mi)^\s*project:\s*(.+)$").unwrap());
static REQUIREMENT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)\b([A-Z][^.\n]*\b(?:must|shall|should)\b[^.\n]*)\.").unwrap());
static TASK_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mi)^\s*(?:-\s*\[[ xX]\]|TODO:?)\s*(.+)$").unwrap());
static TEAM_MEMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bassigned to\s+([A-Z][a-zA-Z]+(?:\s+[A-Z][a-zA-Z]+)?)|@([a-zA-Z0-9_-]+)").unwrap());

const KNOWN_TECHNOLOGIES: &[&str] = &[
    "Rust", "Python", "TypeScript", "JavaScript", "Go", "Java", "Kotlin",
    "PostgreSQL", "MySQL", "SQLite", "Redis", "Kafka", "Docker", "Kubernetes",
    "AWS", "Azure", "GCP", "React", "Vue", "GraphQL", "gRPC", "WebAssembly",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityHints {
    pub clients: Vec<String>,
    pub projects: Vec<String>,
    pub requirements: Vec<String>,
    pub tasks: Vec<String>,
    pub team_members: Vec<String>,
    pub technologies: Vec<String>,
}

impl EntityHints {
    /// Flattens into metadata-friendly `(key, comma-joined value)` pairs,
    /// skipping empty categories, for attachment to `Chunk.metadata`.
    #[must_use]
    pub fn as_metadata_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        for (key, values) in [
            ("hint_clients", &self.clients),
            ("hint_projects", &self.projects),
            ("hint_requirements", &self.requirements),
            ("hint_tasks", &self.tasks),
            ("hint_team_members", &self.team_members),
            ("hint_technologies", &self.technologies),
        ] {
            if !values.is_empty() {
                fields.push((key, values.join(", ")));
            }
        }
        fields
    }
}

#[must_use]
pub fn extract_hints(text: &str) -> EntityHints {
    EntityHints {
        clients: dedup_captures(&CLIENT_LINE, text),
        projects: dedup_captures(&PROJECT_LINE, text),
        requirements: dedup_captures(&REQUIREMENT_LINE, text),
        tasks: dedup_captures(&TASK_LINE, text),
        team_members: extract_team_members(text),
        technologies: extract_technologies(text),
    }
}

fn dedup_captures(pattern: &Regex, text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in pattern.captures_iter(text) {
        let value = caps.get(1).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
        if !value.is_empty() && !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

fn extract_team_members(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in TEAM_MEMBER.captures_iter(text) {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        if !name.is_empty() && !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

fn extract_technologies(text: &str) -> Vec<String> {
    KNOWN_TECHNOLOGIES
        .iter()
        .filter(|tech| contains_word(text, tech))
        .map(|tech| (*tech).to_string())
        .collect()
}

fn contains_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric()).any(|token| token.eq_ignore_ascii_case(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_client_and_project_lines() {
        let text = "Client: Acme Corp\nProject: Migration Phase 2\nsome body text.";
        let hints = extract_hints(text);
        assert_eq!(hints.clients, vec!["Acme Corp"]);
        assert_eq!(hints.projects, vec!["Migration Phase 2"]);
    }

    #[test]
    fn extracts_requirement_sentences() {
        let text = "The system must support multi-tenant isolation. Nothing else here.";
        let hints = extract_hints(text);
        assert_eq!(hints.requirements.len(), 1);
        assert!(hints.requirements[0].contains("must support"));
    }

    #[test]
    fn extracts_task_checklist_items() {
        let text = "- [ ] Write the migration script\n- [x] Review the PR\nTODO: update docs";
        let hints = extract_hints(text);
        assert_eq!(hints.tasks.len(), 3);
    }

    #[test]
    fn extracts_team_members_from_mentions_and_assignment() {
        let text = "Assigned to Jamie Chen for review. Pinged @taylor_dev about it.";
        let hints = extract_hints(text);
        assert!(hints.team_members.contains(&"Jamie Chen".to_string()));
        assert!(hints.team_members.contains(&"taylor_dev".to_string()));
    }

    #[test]
    fn extracts_known_technologies_case_insensitively() {
        let text = "We migrated the service from python to rust, backed by postgresql.";
        let hints = extract_hints(text);
        assert!(hints.technologies.contains(&"Rust".to_string()));
        assert!(hints.technologies.contains(&"Python".to_string()));
        assert!(hints.technologies.contains(&"PostgreSQL".to_string()));
    }

    #[test]
    fn as_metadata_fields_skips_empty_categories() {
        let hints = EntityHints {
            clients: vec!["Acme".to_string()],
            ..Default::default()
        };
        let fields = hints.as_metadata_fields();
        assert_eq!(fields, vec![("hint_clients", "Acme".to_string())]);
    }
}
