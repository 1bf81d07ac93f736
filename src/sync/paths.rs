//! Remote-store path layout.
//!
//! ```text
//! projects/<project-segment>/project.json
//! projects/<project-segment>/<flow-segment>_<flow-id>.json
//! ```
//!
//! The project folder carries only the sanitized name, so two projects
//! whose names sanitize identically share a folder. Flow files append the
//! raw id, which keeps same-named flows apart.

use super::sanitize::sanitize;

/// Root directory for all synced content.
pub const PROJECTS_ROOT: &str = "projects";

/// Folder segment for flows without a (named) project.
pub const NO_PROJECT: &str = "_no_project";

/// Project metadata document name.
pub const PROJECT_FILE: &str = "project.json";

/// Folder holding a project's documents.
#[must_use]
pub fn project_folder(name: Option<&str>, id: Option<&str>) -> String {
    let segment = match (name, id) {
        (Some(name), Some(_)) => sanitize(name),
        _ => String::new(),
    };
    if segment.is_empty() {
        format!("{PROJECTS_ROOT}/{NO_PROJECT}")
    } else {
        format!("{PROJECTS_ROOT}/{segment}")
    }
}

/// Path of a project's metadata document.
#[must_use]
pub fn project_file_path(name: Option<&str>, id: Option<&str>) -> String {
    format!("{}/{PROJECT_FILE}", project_folder(name, id))
}

/// Path of a flow document inside `folder`.
#[must_use]
pub fn flow_file_path(folder: &str, flow_name: &str, flow_id: &str) -> String {
    format!("{folder}/{}_{flow_id}.json", sanitize(flow_name))
}

/// The project segment of a path under [`PROJECTS_ROOT`], if any.
///
/// `projects/Sales/My_Flow_42.json` yields `Sales`.
#[must_use]
pub fn folder_segment(path: &str) -> Option<&str> {
    let mut parts = path.trim_start_matches('/').split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(PROJECTS_ROOT), Some(segment), Some(_)) if !segment.is_empty() => Some(segment),
        _ => None,
    }
}

/// Whether a directory entry name is a flow document (not the metadata file).
#[must_use]
pub fn is_flow_document(file_name: &str) -> bool {
    file_name.ends_with(".json") && file_name != PROJECT_FILE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_folder_named() {
        assert_eq!(project_folder(Some("Sales"), Some("7")), "projects/Sales");
        assert_eq!(
            project_folder(Some("Q3 Pipeline!"), Some("7")),
            "projects/Q3_Pipeline"
        );
    }

    #[test]
    fn test_project_folder_fallbacks() {
        assert_eq!(project_folder(None, None), "projects/_no_project");
        assert_eq!(project_folder(Some(""), Some("7")), "projects/_no_project");
        assert_eq!(project_folder(Some("Sales"), None), "projects/_no_project");
        assert_eq!(project_folder(None, Some("7")), "projects/_no_project");
        assert_eq!(project_folder(Some("???"), Some("7")), "projects/_no_project");
    }

    #[test]
    fn test_project_file_path() {
        assert_eq!(
            project_file_path(Some("Sales"), Some("7")),
            "projects/Sales/project.json"
        );
    }

    #[test]
    fn test_flow_file_path() {
        assert_eq!(
            flow_file_path("projects/Sales", "My Flow!", "42"),
            "projects/Sales/My_Flow_42.json"
        );
    }

    #[test]
    fn test_flow_paths_distinct_for_colliding_names() {
        let a = flow_file_path("projects/Sales", "My Flow!", "1");
        let b = flow_file_path("projects/Sales", "My  Flow", "2");
        assert_ne!(a, b);
        assert_eq!(a, flow_file_path("projects/Sales", "My Flow!", "1"));
    }

    #[test]
    fn test_folder_segment() {
        assert_eq!(folder_segment("projects/Sales/My_Flow_42.json"), Some("Sales"));
        assert_eq!(folder_segment("/projects/Sales/x.json"), Some("Sales"));
        assert_eq!(folder_segment("projects/x.json"), None);
        assert_eq!(folder_segment("other/Sales/x.json"), None);
    }

    #[test]
    fn test_is_flow_document() {
        assert!(is_flow_document("My_Flow_42.json"));
        assert!(!is_flow_document("project.json"));
        assert!(!is_flow_document("README.md"));
    }
}
