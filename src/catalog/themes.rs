//! Built-in visual themes.

use serde::{Deserialize, Serialize};

/// Light or dark color mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    /// Returns the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Returns the opposite mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

/// Whether a theme uses a still background or a looping video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKind {
    Static,
    Animated,
}

/// Style values applied by a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeStyles {
    /// Background image URL, static themes only
    pub bg_image: Option<&'static str>,
    pub bg_color: &'static str,
    pub panel_bg: &'static str,
}

/// A visual theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub mode: ThemeMode,
    pub kind: ThemeKind,
    pub preview_image: &'static str,
    /// Looping background video, animated themes only
    pub background_video: Option<&'static str>,
    pub styles: ThemeStyles,
}

/// All built-in themes. The first static theme of each mode is its default.
pub const THEMES: &[Theme] = &[
    Theme {
        id: "dark-default",
        name: "Oscuro Básico",
        mode: ThemeMode::Dark,
        kind: ThemeKind::Static,
        preview_image: "https://placehold.co/100x80/1a1a1a/f0f0f0?text=Básico",
        background_video: None,
        styles: ThemeStyles {
            bg_image: None,
            bg_color: "#1a1a1a",
            panel_bg: "#242526",
        },
    },
    Theme {
        id: "ocean-night",
        name: "Noche Oceánica",
        mode: ThemeMode::Dark,
        kind: ThemeKind::Static,
        preview_image: "https://placehold.co/100x80/0d1b2a/e0e1dd?text=Océano",
        background_video: None,
        styles: ThemeStyles {
            bg_image: Some("https://images.unsplash.com/photo-1519751138087-5bf79df62d5b?q=80&w=1974&auto=format&fit=crop"),
            bg_color: "#0d1b2a",
            panel_bg: "rgba(29, 41, 57, 0.8)",
        },
    },
    Theme {
        id: "deep-forest",
        name: "Bosque Profundo",
        mode: ThemeMode::Dark,
        kind: ThemeKind::Static,
        preview_image: "https://placehold.co/100x80/1A2A22/C4D3CA?text=Bosque",
        background_video: None,
        styles: ThemeStyles {
            bg_image: Some("https://images.unsplash.com/photo-1448375240586-882707db888b?q=80&w=2070&auto=format&fit=crop"),
            bg_color: "#1A2A22",
            panel_bg: "rgba(20, 35, 28, 0.85)",
        },
    },
    Theme {
        id: "neon-noir",
        name: "Neón Nocturno",
        mode: ThemeMode::Dark,
        kind: ThemeKind::Static,
        preview_image: "https://placehold.co/100x80/2A0A2A/FF00FF?text=Neón",
        background_video: None,
        styles: ThemeStyles {
            bg_image: Some("https://images.unsplash.com/photo-1574871786522-86462e3630a2?q=80&w=2070&auto=format&fit=crop"),
            bg_color: "#2A0A2A",
            panel_bg: "rgba(30, 10, 30, 0.8)",
        },
    },
    Theme {
        id: "light-default",
        name: "Claro Básico",
        mode: ThemeMode::Light,
        kind: ThemeKind::Static,
        preview_image: "https://placehold.co/100x80/f8f9fa/212529?text=Básico",
        background_video: None,
        styles: ThemeStyles {
            bg_image: None,
            bg_color: "#f8f9fa",
            panel_bg: "#ffffff",
        },
    },
    Theme {
        id: "mint-fresh",
        name: "Menta Fresca",
        mode: ThemeMode::Light,
        kind: ThemeKind::Static,
        preview_image: "https://placehold.co/100x80/F0FBF6/1F5C3C?text=Menta",
        background_video: None,
        styles: ThemeStyles {
            bg_image: Some("https://images.unsplash.com/photo-1530177150314-e4a79a32252a?q=80&w=2070&auto=format&fit=crop"),
            bg_color: "#f0fbf6",
            panel_bg: "rgba(255, 255, 255, 0.85)",
        },
    },
    Theme {
        id: "parchment",
        name: "Pergamino",
        mode: ThemeMode::Light,
        kind: ThemeKind::Static,
        preview_image: "https://placehold.co/100x80/FDF6E3/584C3A?text=Pergamino",
        background_video: None,
        styles: ThemeStyles {
            bg_image: Some("https://images.unsplash.com/photo-1593902381395-928543324ed8?q=80&w=1932&auto=format&fit=crop"),
            bg_color: "#fdf6e3",
            panel_bg: "rgba(253, 246, 227, 0.8)",
        },
    },
    Theme {
        id: "clear-sky",
        name: "Cielo Despejado",
        mode: ThemeMode::Light,
        kind: ThemeKind::Static,
        preview_image: "https://placehold.co/100x80/E1F5FE/01579B?text=Cielo",
        background_video: None,
        styles: ThemeStyles {
            bg_image: Some("https://images.unsplash.com/photo-1563630381-55b43b5e4344?q=80&w=1974&auto=format&fit=crop"),
            bg_color: "#e1f5fe",
            panel_bg: "rgba(240, 248, 255, 0.85)",
        },
    },
    Theme {
        id: "animated-forest",
        name: "Bosque Encantado",
        mode: ThemeMode::Dark,
        kind: ThemeKind::Animated,
        preview_image: "https://placehold.co/100x80/0d1a0a/90ee90?text=Bosque",
        background_video: Some("/bosque.mp4"),
        styles: ThemeStyles {
            bg_image: None,
            bg_color: "#0d1a0a",
            panel_bg: "rgba(20, 35, 28, 0.75)",
        },
    },
    Theme {
        id: "animated-modern",
        name: "Flujo Moderno",
        mode: ThemeMode::Light,
        kind: ThemeKind::Animated,
        preview_image: "https://placehold.co/100x80/e0e0e0/333333?text=Moderno",
        background_video: Some("/moderno.mp4"),
        styles: ThemeStyles {
            bg_image: None,
            bg_color: "#e0e0e0",
            panel_bg: "rgba(255, 255, 255, 0.7)",
        },
    },
];

/// Finds a theme by id.
#[must_use]
pub fn find_theme(id: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|theme| theme.id == id)
}

/// Returns the themes of the given mode and kind, in catalog order.
pub fn themes_for(mode: ThemeMode, kind: ThemeKind) -> impl Iterator<Item = &'static Theme> {
    THEMES
        .iter()
        .filter(move |theme| theme.mode == mode && theme.kind == kind)
}

/// Returns the first static theme of a mode.
#[must_use]
pub fn default_theme_for(mode: ThemeMode) -> &'static Theme {
    themes_for(mode, ThemeKind::Static)
        .next()
        .unwrap_or(&THEMES[0])
}

/// Resolves the theme to apply for a selected id.
///
/// Unknown ids fall back to the default theme of `mode`.
#[must_use]
pub fn resolve_theme(selected_id: &str, mode: ThemeMode) -> &'static Theme {
    find_theme(selected_id).unwrap_or_else(|| default_theme_for(mode))
}
