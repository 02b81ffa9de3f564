use serde::Serialize;

/// Chart.js is loaded from its CDN rather than bundled.
pub const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js";

/// Declarative module registration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleManifest {
    pub name: &'static str,
    pub version: &'static str,
    pub category: &'static str,
    pub summary: &'static str,
    pub description: &'static str,
    pub depends: Vec<&'static str>,
    pub data: Vec<&'static str>,
    /// Asset bundle name → files.
    pub assets: Vec<(&'static str, Vec<&'static str>)>,
    pub installable: bool,
    pub auto_install: bool,
    pub license: &'static str,
}

impl ModuleManifest {
    pub fn sale_dashboard() -> Self {
        Self {
            name: "Sale Dashboard",
            version: "18.0.1.0.0",
            category: "Sales",
            summary: "Dashboard for Sale Orders",
            description: "This module adds a dashboard to the sale order list view showing key \
                          metrics and statistics.",
            depends: vec!["sale_management", "web", "stock"],
            data: vec!["views/sale_order_views.xml"],
            assets: vec![(
                "web.assets_backend",
                vec!["sale_dashboard/static/src/**/*", CHART_JS_CDN],
            )],
            installable: true,
            auto_install: false,
            license: "LGPL-3",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_declares_dependencies_and_license() {
        let m = ModuleManifest::sale_dashboard();
        assert!(m.depends.contains(&"stock"));
        assert!(m.installable && !m.auto_install);

        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["license"], "LGPL-3");
        assert_eq!(json["summary"], "Dashboard for Sale Orders");
        assert_eq!(json["assets"][0][0], "web.assets_backend");
        assert_eq!(
            json["assets"][0][1],
            serde_json::json!(["sale_dashboard/static/src/**/*", "https://cdn.jsdelivr.net/npm/chart.js"])
        );
        assert!(json.get("author").is_none());
    }
}
