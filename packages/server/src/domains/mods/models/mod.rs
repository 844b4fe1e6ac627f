pub mod game_version;
pub mod mod_version;
pub mod registry_mod;

pub use game_version::{GameVersion, NewGameVersion};
pub use mod_version::{ContentHash, ModVersion, NewModVersion};
pub use registry_mod::{Mod, NewMod};
