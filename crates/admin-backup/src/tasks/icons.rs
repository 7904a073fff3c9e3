//! Site icons. The panel only shows previews; the binaries are downloaded
//! from each preview's `src`.

use scraper::Html;
use serde::Serialize;

use crate::gateway::ModuleGateway;
use crate::markup::find;
use crate::types::{BackupResult, ModuleParams};

pub const ICONS_MODULE: &str = "managesite/ManageSiteIconsModule";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconKind {
    Favicon,
    AppleTouchIcon,
    TileIcon,
}

impl IconKind {
    pub const ALL: [IconKind; 3] = [
        IconKind::Favicon,
        IconKind::AppleTouchIcon,
        IconKind::TileIcon,
    ];

    fn preview_selector(self) -> &'static str {
        match self {
            IconKind::Favicon => "img#favicon-preview",
            IconKind::AppleTouchIcon => "img#apple-touch-icon-preview",
            IconKind::TileIcon => "img#tile-icon-preview",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IconKind::Favicon => "favicon",
            IconKind::AppleTouchIcon => "apple_touch_icon",
            IconKind::TileIcon => "tile_icon",
        }
    }
}

/// An uploaded icon. Held only until the archive is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub kind: IconKind,
    pub filename: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Icons {
    pub favicon: Option<Icon>,
    pub apple_touch_icon: Option<Icon>,
    pub tile_icon: Option<Icon>,
}

impl Icons {
    pub fn into_vec(self) -> Vec<Icon> {
        [self.favicon, self.apple_touch_icon, self.tile_icon]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Source URLs of the uploaded icons, in `IconKind::ALL` order.
pub fn parse_icon_sources(doc: &Html) -> [Option<String>; 3] {
    IconKind::ALL.map(|kind| {
        find(doc, kind.preview_selector())
            .and_then(|img| img.value().attr("src").map(str::trim).map(String::from))
            .filter(|src| !src.is_empty())
    })
}

/// Last path segment of an asset URL, without query or fragment.
pub fn icon_filename(kind: IconKind, src: &str) -> String {
    let path = src.split(['?', '#']).next().unwrap_or_default();
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => kind.as_str().to_string(),
    }
}

async fn fetch_icon(
    gw: &ModuleGateway,
    kind: IconKind,
    src: Option<&str>,
) -> BackupResult<Option<Icon>> {
    let Some(src) = src else {
        return Ok(None);
    };
    let content = gw.fetch_asset(src).await?;
    Ok(Some(Icon {
        kind,
        filename: icon_filename(kind, src),
        content,
    }))
}

/// Read the icon previews, then download all three concurrently.
pub async fn fetch_icons(gw: &ModuleGateway) -> BackupResult<Icons> {
    let [favicon, apple, tile] =
        parse_icon_sources(&gw.call_markup(ICONS_MODULE, &ModuleParams::new()).await?);

    let (favicon, apple_touch_icon, tile_icon) = futures::try_join!(
        fetch_icon(gw, IconKind::Favicon, favicon.as_deref()),
        fetch_icon(gw, IconKind::AppleTouchIcon, apple.as_deref()),
        fetch_icon(gw, IconKind::TileIcon, tile.as_deref()),
    )?;

    Ok(Icons {
        favicon,
        apple_touch_icon,
        tile_icon,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;

    const PREVIEWS: &str = r#"
        <img id="favicon-preview" src="https://scp-wiki.wdfiles.com/local--favicon/favicon.gif?1611337846">
        <img id="apple-touch-icon-preview" src="">
        <img id="tile-icon-preview" src="https://scp-wiki.wdfiles.com/local--tile/tile.png">"#;

    #[test]
    fn test_sources_skip_missing_uploads() {
        let [favicon, apple, tile] = parse_icon_sources(&Html::parse_fragment(PREVIEWS));
        assert!(favicon.unwrap().ends_with("favicon.gif?1611337846"));
        assert_eq!(apple, None);
        assert!(tile.is_some());
    }

    #[test]
    fn test_filename_from_source() {
        assert_eq!(
            icon_filename(IconKind::Favicon, "https://x.wdfiles.com/local--favicon/favicon.gif?123"),
            "favicon.gif"
        );
        assert_eq!(icon_filename(IconKind::TileIcon, "/local--tile/"), "tile_icon");
    }

    #[tokio::test]
    async fn test_fetch_downloads_present_icons() {
        let transport = ScriptedTransport::new()
            .respond_body(ICONS_MODULE, PREVIEWS)
            .asset("https://scp-wiki.wdfiles.com/local--favicon/favicon.gif?1611337846", b"GIF89a")
            .asset("https://scp-wiki.wdfiles.com/local--tile/tile.png", b"\x89PNG");

        let icons = fetch_icons(&transport.gateway()).await.unwrap();
        let favicon = icons.favicon.clone().unwrap();
        assert_eq!(favicon.filename, "favicon.gif");
        assert_eq!(favicon.content, b"GIF89a");
        assert!(icons.apple_touch_icon.is_none());
        assert_eq!(icons.into_vec().len(), 2);
    }
}
