#![allow(dead_code)]

use serde_json::{Value, json};
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Workspace with a page snapshot and a private slide store
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("page.json"), page_snapshot().to_string())
            .expect("Failed to write snapshot");
        Self { dir }
    }

    pub fn snapshot(&self) -> String {
        self.dir.path().join("page.json").display().to_string()
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("slides.json")
    }

    /// Run the binary against this workspace's store
    pub fn run(&self, args: &[&str]) -> (Value, i32) {
        let output = Command::new(env!("CARGO_BIN_EXE_webpresenter"))
            .arg("--store")
            .arg(self.store_path())
            .args(args)
            .output()
            .expect("Failed to execute webpresenter");

        let stdout = String::from_utf8_lossy(&output.stdout);
        let exit_code = output.status.code().unwrap_or(-1);
        let json = serde_json::from_str(&stdout)
            .unwrap_or_else(|_| Value::String(stdout.to_string()));
        (json, exit_code)
    }
}

/// A small page: an intro section and a two-item menu
pub fn page_snapshot() -> Value {
    json!({
        "viewport": { "width": 1000, "height": 600, "scroll_y": 0 },
        "body": {
            "children": [
                {
                    "tag": "section",
                    "attrs": { "id": "intro", "class": "hero" },
                    "rect": { "top": 10, "left": 10, "width": 300, "height": 100 },
                    "children": ["Welcome"]
                },
                {
                    "tag": "ul",
                    "attrs": { "id": "menu" },
                    "children": [
                        {
                            "tag": "li",
                            "rect": { "top": 180, "left": 10, "width": 80, "height": 20 },
                            "children": ["Home"]
                        },
                        {
                            "tag": "li",
                            "rect": { "top": 200, "left": 10, "width": 80, "height": 20 },
                            "children": [
                                { "tag": "a", "attrs": { "href": "/about?ref=menu" }, "children": ["About"] }
                            ]
                        }
                    ]
                }
            ]
        }
    })
}
