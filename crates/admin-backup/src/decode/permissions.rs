//! Page and forum permission codes.
//!
//! A code is a `;`-joined list of `action:scopes` groups such as
//! `v:armo;c:m;e:mo`. Each action is a single letter, each scope letter
//! grants the action to one audience. Letters we don't know are ignored;
//! only a group without a `:` is a fault.

use serde::{Deserialize, Serialize};

use crate::types::{BackupError, BackupResult};

/// Audiences an action is granted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeFlags {
    pub anonymous: bool,
    pub registered: bool,
    pub member: bool,
    /// The page creator, or the thread/post owner on forums.
    pub creator: bool,
}

impl ScopeFlags {
    fn from_letters(letters: &str) -> Self {
        let mut flags = ScopeFlags::default();
        for letter in letters.chars() {
            match letter {
                'a' => flags.anonymous = true,
                'r' => flags.registered = true,
                'm' => flags.member = true,
                'o' => flags.creator = true,
                _ => {}
            }
        }
        flags
    }
}

/// Per-category page permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePermissions {
    /// Whether the category overrides the site default.
    pub enabled: bool,
    pub view_pages: ScopeFlags,
    pub create_pages: ScopeFlags,
    pub edit_pages: ScopeFlags,
    pub move_pages: ScopeFlags,
    pub delete_pages: ScopeFlags,
    pub upload_files: ScopeFlags,
    pub rename_files: ScopeFlags,
    pub replace_files: ScopeFlags,
    pub show_options: ScopeFlags,
}

/// Per-category forum permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumPermissions {
    pub create_threads: ScopeFlags,
    pub create_posts: ScopeFlags,
    pub edit_posts: ScopeFlags,
}

fn groups(code: &str) -> BackupResult<Vec<(&str, ScopeFlags)>> {
    code.split(';')
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .map(|group| {
            group
                .split_once(':')
                .map(|(action, scopes)| (action, ScopeFlags::from_letters(scopes)))
                .ok_or_else(|| BackupError::MalformedPermissions(group.to_string()))
        })
        .collect()
}

/// Decode a page permission code; `None` means the category has none.
pub fn decode_page_permissions(
    enabled: bool,
    code: Option<&str>,
) -> BackupResult<Option<PagePermissions>> {
    let Some(code) = code else {
        return Ok(None);
    };

    let mut perms = PagePermissions {
        enabled,
        ..PagePermissions::default()
    };
    for (action, flags) in groups(code)? {
        let slot = match action {
            "v" => &mut perms.view_pages,
            "c" => &mut perms.create_pages,
            "e" => &mut perms.edit_pages,
            "m" => &mut perms.move_pages,
            "d" => &mut perms.delete_pages,
            "a" => &mut perms.upload_files,
            "r" => &mut perms.rename_files,
            "z" => &mut perms.replace_files,
            "o" => &mut perms.show_options,
            _ => continue,
        };
        *slot = flags;
    }
    Ok(Some(perms))
}

/// Decode a forum permission code; `None` means the board inherits.
///
/// The panel also emits an `s` (split thread) group, which is not kept.
pub fn decode_forum_permissions(code: Option<&str>) -> BackupResult<Option<ForumPermissions>> {
    let Some(code) = code else {
        return Ok(None);
    };

    let mut perms = ForumPermissions::default();
    for (action, flags) in groups(code)? {
        let slot = match action {
            "t" => &mut perms.create_threads,
            "p" => &mut perms.create_posts,
            "e" => &mut perms.edit_posts,
            _ => continue,
        };
        *slot = flags;
    }
    Ok(Some(perms))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: ScopeFlags = ScopeFlags {
        anonymous: true,
        registered: true,
        member: true,
        creator: true,
    };

    #[test]
    fn test_null_code_yields_none() {
        assert_eq!(decode_page_permissions(true, None).unwrap(), None);
        assert_eq!(decode_forum_permissions(None).unwrap(), None);
    }

    #[test]
    fn test_page_view_only() {
        let perms = decode_page_permissions(true, Some("v:armo;c:;e:;m:;d:;a:;r:;z:;o:"))
            .unwrap()
            .unwrap();
        assert!(perms.enabled);
        assert_eq!(perms.view_pages, ALL);
        for other in [
            perms.create_pages,
            perms.edit_pages,
            perms.move_pages,
            perms.delete_pages,
            perms.upload_files,
            perms.rename_files,
            perms.replace_files,
            perms.show_options,
        ] {
            assert_eq!(other, ScopeFlags::default());
        }
    }

    #[test]
    fn test_forum_drops_split() {
        let perms = decode_forum_permissions(Some("t:;p:m;e:o;s:")).unwrap().unwrap();
        assert_eq!(perms.create_threads, ScopeFlags::default());
        assert!(perms.create_posts.member);
        assert!(!perms.create_posts.anonymous && !perms.create_posts.registered && !perms.create_posts.creator);
        assert!(perms.edit_posts.creator);
        assert!(!perms.edit_posts.anonymous && !perms.edit_posts.registered && !perms.edit_posts.member);

        let json = serde_json::to_value(&perms).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert!(!keys.iter().any(|k| k.contains("split")));
    }

    #[test]
    fn test_unknown_letters_are_ignored() {
        let perms = decode_page_permissions(false, Some("v:axq;y:armo")).unwrap().unwrap();
        assert!(!perms.enabled);
        assert!(perms.view_pages.anonymous);
        assert!(!perms.view_pages.member);
    }

    #[test]
    fn test_trailing_separator_is_tolerated() {
        let perms = decode_page_permissions(true, Some("e:m;")).unwrap().unwrap();
        assert!(perms.edit_pages.member);
    }

    #[test]
    fn test_group_without_colon_is_malformed() {
        assert!(matches!(
            decode_page_permissions(true, Some("v:a;cm")),
            Err(BackupError::MalformedPermissions(g)) if g == "cm"
        ));
    }
}
