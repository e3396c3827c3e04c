use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ManifestIcon {
    pub src: &'static str,
    pub sizes: &'static str,
    #[serde(rename = "type")]
    pub mime_type: &'static str,
    pub purpose: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebAppManifest {
    pub name: &'static str,
    pub short_name: &'static str,
    pub description: &'static str,
    pub start_url: &'static str,
    pub display: &'static str,
    pub background_color: &'static str,
    pub theme_color: &'static str,
    pub icons: Vec<ManifestIcon>,
}

impl WebAppManifest {
    pub fn steller_seller() -> Self {
        Self {
            name: "Steller Seller",
            short_name: "Steller Seller",
            description: "A Progressive Web App built with Next.js",
            start_url: "/",
            display: "standalone",
            background_color: "#ffffff",
            theme_color: "#000000",
            icons: vec![
                icon("/pwa-192x192.png", "192x192", "any"),
                icon("/pwa-512x512.png", "512x512", "any"),
                icon("/pwa-maskable-192x192.png", "192x192", "maskable"),
                icon("/pwa-maskable-512x512.png", "512x512", "maskable"),
            ],
        }
    }
}

fn icon(src: &'static str, sizes: &'static str, purpose: &'static str) -> ManifestIcon {
    ManifestIcon {
        src,
        sizes,
        mime_type: "image/png",
        purpose,
    }
}
