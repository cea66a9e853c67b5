//! Typed view of the extension manifest.
//!
//! Only the fields whose values are file paths are modeled; everything else
//! in `manifest.json` is ignored on parse. Tools that rewrite the manifest
//! must go through `serde_json::Value` so unknown fields survive.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Manifest file name, at the extension root and in the output directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Background script declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Background {
    /// Service worker path (MV3).
    pub service_worker: Option<String>,
}

/// Toolbar action declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Action {
    /// Popup HTML page.
    pub default_popup: Option<String>,
    /// Action icon paths, keyed by size.
    #[serde(default)]
    pub default_icon: BTreeMap<String, String>,
}

/// Side panel declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SidePanel {
    /// Side panel HTML page.
    pub default_path: Option<String>,
}

/// A content script declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContentScript {
    /// Injected scripts.
    #[serde(default)]
    pub js: Vec<String>,
    /// Injected stylesheets.
    #[serde(default)]
    pub css: Vec<String>,
}

/// The path-bearing subset of `manifest.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    /// Background declaration.
    pub background: Option<Background>,
    /// Toolbar action declaration.
    pub action: Option<Action>,
    /// Extension icon paths, keyed by size.
    #[serde(default)]
    pub icons: BTreeMap<String, String>,
    /// Options page.
    pub options_page: Option<String>,
    /// Side panel declaration.
    pub side_panel: Option<SidePanel>,
    /// Content script declarations.
    #[serde(default)]
    pub content_scripts: Vec<ContentScript>,
}

impl Manifest {
    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parses a manifest from a JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Returns every file path the manifest references, in a fixed order:
    /// service worker, popup, action icons, extension icons, options page,
    /// side panel, then each content script's js and css lists.
    pub fn referenced_paths(&self) -> Vec<&str> {
        let mut paths = Vec::new();

        if let Some(bg) = &self.background {
            if let Some(sw) = &bg.service_worker {
                paths.push(sw.as_str());
            }
        }

        if let Some(action) = &self.action {
            if let Some(popup) = &action.default_popup {
                paths.push(popup.as_str());
            }
            for icon in action.default_icon.values() {
                paths.push(icon.as_str());
            }
        }

        for icon in self.icons.values() {
            paths.push(icon.as_str());
        }

        if let Some(options) = &self.options_page {
            paths.push(options.as_str());
        }

        if let Some(panel) = &self.side_panel {
            if let Some(path) = &panel.default_path {
                paths.push(path.as_str());
            }
        }

        for script in &self.content_scripts {
            for js in &script.js {
                paths.push(js.as_str());
            }
            for css in &script.css {
                paths.push(css.as_str());
            }
        }

        paths
    }
}
