//! Load-once stylesheet registration.
//!
//! Sheets are static and registered at most once per process. Nothing is
//! ever removed: views that need a sheet call [`StyleRegistry::ensure`] and the
//! page head is produced from whatever has been registered so far.

use std::sync::LazyLock;

use parking_lot::Mutex;

/// A named, static block of CSS.
#[derive(Debug, PartialEq, Eq)]
pub struct Stylesheet {
    pub id: &'static str,
    pub css: &'static str,
}

pub const CODE_BLOCKS: Stylesheet = Stylesheet {
    id: "inkpost-code-blocks",
    css: r#".code-block { margin: 16px 0; border-radius: 8px; overflow: hidden; background: #1e293b; }
.code-block-header { display: flex; justify-content: space-between; align-items: center; padding: 6px 12px; background: #0f172a; color: #94a3b8; font-size: 12px; }
.code-block-lang { text-transform: lowercase; font-family: ui-monospace, monospace; }
.code-copy-btn { border: 0; border-radius: 4px; padding: 2px 8px; background: #334155; color: #e2e8f0; cursor: pointer; }
.code-copy-btn:hover { background: #475569; }
.code-block-pre { margin: 0; padding: 12px; overflow-x: auto; color: #e2e8f0; }"#,
};

pub const PROSE: Stylesheet = Stylesheet {
    id: "inkpost-prose",
    css: r#".prose-h1 { font-size: 2.25rem; font-weight: 800; margin: 1.5rem 0 1rem; }
.prose-h2 { font-size: 1.75rem; font-weight: 700; margin: 1.25rem 0 0.75rem; }
.prose-h3 { font-size: 1.375rem; font-weight: 600; margin: 1rem 0 0.5rem; }
.prose-link { color: #2563eb; text-decoration: underline; }
.prose-inline-code { background: #f1f5f9; color: #be185d; }
.prose-ul { list-style: disc; padding-left: 1.5rem; margin: 0.5rem 0; }
.prose-ol { list-style: decimal; padding-left: 1.5rem; margin: 0.5rem 0; }
.prose-blockquote { border-left: 4px solid #cbd5e1; padding-left: 1rem; color: #475569; font-style: italic; }"#,
};

pub const ANIMATIONS: Stylesheet = Stylesheet {
    id: "inkpost-animations",
    css: r#"@keyframes inkpost-fade-in { from { opacity: 0; transform: translateY(8px); } to { opacity: 1; transform: none; } }
.fade-in { animation: inkpost-fade-in 0.4s ease-out both; }
@media (prefers-reduced-motion: reduce) { .fade-in { animation: none; } }"#,
};

static GLOBAL: LazyLock<StyleRegistry> = LazyLock::new(StyleRegistry::new);

/// Set of registered stylesheets, in registration order.
#[derive(Debug, Default)]
pub struct StyleRegistry {
    sheets: Mutex<Vec<&'static Stylesheet>>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry.
    pub fn global() -> &'static StyleRegistry {
        &GLOBAL
    }

    /// Registers `sheet` unless a sheet with the same id is present.
    /// Returns `true` only for the call that registered it.
    pub fn ensure(&self, sheet: &'static Stylesheet) -> bool {
        let mut sheets = self.sheets.lock();
        if sheets.iter().any(|s| s.id == sheet.id) {
            return false;
        }
        tracing::debug!(id = sheet.id, "Registered stylesheet");
        sheets.push(sheet);
        true
    }

    pub fn ensure_all(&self, sheets: &[&'static Stylesheet]) {
        for sheet in sheets {
            self.ensure(sheet);
        }
    }

    pub fn is_present(&self, id: &str) -> bool {
        self.sheets.lock().iter().any(|s| s.id == id)
    }

    /// `<style>` elements for every registered sheet.
    pub fn head_html(&self) -> String {
        self.sheets
            .lock()
            .iter()
            .map(|sheet| format!(r#"<style id="{}">{}</style>"#, sheet.id, sheet.css))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
