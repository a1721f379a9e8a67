//! Built-in ambient background sounds.

use serde::Serialize;

/// Id used to turn ambient sound off.
pub const NO_SOUND_ID: &str = "none";

/// An ambient background sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AmbientSound {
    /// Identifier, also the file stem under the sounds directory
    pub id: &'static str,
    pub name: &'static str,
    pub file_name: &'static str,
}

/// All ambient sounds shipped with the timer.
pub const AMBIENT_SOUNDS: &[AmbientSound] = &[
    AmbientSound {
        id: "noche-campo",
        name: "Noche en el Campo",
        file_name: "noche-campo.mp3",
    },
    AmbientSound {
        id: "nuevo-dia",
        name: "Nuevo Día",
        file_name: "nuevo-dia.mp3",
    },
    AmbientSound {
        id: "noche-de-disco",
        name: "Noche de Disco",
        file_name: "noche-de-disco.mp3",
    },
    AmbientSound {
        id: "espacio",
        name: "Espacio Sideral",
        file_name: "espacio.mp3",
    },
    AmbientSound {
        id: "lluvia-relajante",
        name: "Lluvia Relajante",
        file_name: "lluvia-relajante.mp3",
    },
];

/// Finds an ambient sound by id. `none` and unknown ids return `None`.
#[must_use]
pub fn find_ambient_sound(id: &str) -> Option<&'static AmbientSound> {
    AMBIENT_SOUNDS.iter().find(|sound| sound.id == id)
}

/// Returns true if `id` is `none` or a catalog entry.
#[must_use]
pub fn is_known_sound_id(id: &str) -> bool {
    id == NO_SOUND_ID || find_ambient_sound(id).is_some()
}
