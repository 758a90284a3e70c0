use crate::config::ContentTypeConfig;
use serde::Serialize;

/// What an options menu entry does when chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionAction {
    /// Drag handle; choosing it does nothing by itself
    Move,
    Edit,
    ToggleVisibility,
    Duplicate,
    Remove,
}

/// One entry of a node's options menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionEntry {
    pub code: &'static str,
    pub title: String,
    pub icon: Option<&'static str>,
    pub classes: Vec<&'static str>,
    pub sort: u32,
    /// `None` for the title entry, which only displays the label
    pub action: Option<OptionAction>,
}

impl OptionEntry {
    fn new(code: &'static str, title: impl Into<String>, sort: u32) -> Self {
        Self {
            code,
            title: title.into(),
            icon: None,
            classes: Vec::new(),
            sort,
            action: None,
        }
    }

    fn icon(mut self, icon: &'static str) -> Self {
        self.icon = Some(icon);
        self
    }

    fn class(mut self, class: &'static str) -> Self {
        self.classes.push(class);
        self
    }

    fn action(mut self, action: OptionAction) -> Self {
        self.action = Some(action);
        self
    }
}

/// Options menu for a content type, ordered by sort key
///
/// The hide/show entry is only offered for hideable types and is labelled
/// for the action it performs given the current visibility.
pub fn retrieve_options(config: &ContentTypeConfig, display: bool) -> Vec<OptionEntry> {
    let mut options = vec![
        OptionEntry::new("move", "Move", 10)
            .icon("icon-admin-pagebuilder-handle")
            .class("move-structural")
            .action(OptionAction::Move),
        OptionEntry::new("title", config.label.clone(), 20),
        OptionEntry::new("edit", "Edit", 30)
            .icon("icon-admin-pagebuilder-systems")
            .class("edit-content-type")
            .action(OptionAction::Edit),
        OptionEntry::new("duplicate", "Duplicate", 50)
            .icon("icon-pagebuilder-copy")
            .class("duplicate-structural")
            .action(OptionAction::Duplicate),
        OptionEntry::new("remove", "Remove", 60)
            .icon("icon-admin-pagebuilder-remove")
            .class("remove-structural")
            .action(OptionAction::Remove),
    ];

    if config.is_hideable {
        let (title, icon) = if display {
            ("Hide", "icon-pagebuilder-hide")
        } else {
            ("Show", "icon-pagebuilder-show")
        };
        options.push(
            OptionEntry::new("hideShow", title, 40)
                .icon(icon)
                .class("hide-show-content-type")
                .action(OptionAction::ToggleVisibility),
        );
    }

    options.sort_by_key(|option| option.sort);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElementTemplate;

    fn config(is_hideable: bool) -> ContentTypeConfig {
        ContentTypeConfig {
            name: "row".into(),
            label: "Row".into(),
            is_hideable,
            appearance: "default".into(),
            allowed_children: Vec::new(),
            fields: Vec::new(),
            fields_to_ignore_on_remove: Vec::new(),
            template: ElementTemplate::new("main", "div"),
        }
    }

    #[test]
    fn test_options_are_sorted() {
        let codes: Vec<&str> = retrieve_options(&config(true), true)
            .iter()
            .map(|option| option.code)
            .collect();
        assert_eq!(codes, vec!["move", "title", "edit", "hideShow", "duplicate", "remove"]);
    }

    #[test]
    fn test_hide_show_only_when_hideable() {
        let options = retrieve_options(&config(false), true);
        assert!(options.iter().all(|option| option.code != "hideShow"));
        assert_eq!(options[1].title, "Row");
    }

    #[test]
    fn test_hide_show_title_follows_visibility() {
        let hidden = retrieve_options(&config(true), false);
        let toggle = hidden.iter().find(|option| option.code == "hideShow").unwrap();
        assert_eq!(toggle.title, "Show");
    }
}
