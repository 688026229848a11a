//! Application-wide constants
//!
//! File names, limits and built-in defaults used throughout the customizer,
//! providing a single source of truth for values the game also depends on.

/// Files and directories inside the game directory
pub mod paths {
    /// Localization strings (`KEY="value"`)
    pub const LOCALIZATION_FILE: &str = "localization.cfg";

    /// Font selection and sizes
    pub const FONT_FILE: &str = "font.cfg";

    /// Standard decor toggles (`NAME=true|false`)
    pub const DECOR_FILE: &str = "decor.cfg";

    /// Committed custom decoration images
    pub const DECOR_DIR: &str = "decor";

    /// Images received from the picker, waiting for the next save
    pub const STAGING_DIR: &str = "decor_staging";

    /// Extension of decoration images on disk
    pub const DECOR_EXTENSION: &str = "png";

    /// Extension of a decoration parked mid-rename, ignored by folder scans
    pub const RENAME_PARK_EXTENSION: &str = "renaming";

    /// Environment variable overriding the game directory
    pub const GAME_DIR_ENV: &str = "SENSE_GAME_DIR";

    /// Directory name under the platform data dir when no override is set
    pub const GAME_DIR_NAME: &str = "SENSE";
}

/// Config file syntax
pub mod syntax {
    /// Comment line prefix
    pub const COMMENT_PREFIX: char = '#';

    /// Key/value separator
    pub const SEPARATOR: char = '=';

    /// What a `\t` escape expands to
    pub const TAB_EXPANSION: &str = "    ";

    /// Header written at the top of localization.cfg
    pub const LOCALIZATION_HEADER: &[&str] = &[
        "# SENSE localization",
        "# Escape sequences inside quotes: \\n (new line), \\t (tab), \\\" (quote), \\\\ (backslash)",
    ];

    /// Header written at the top of font.cfg
    pub const FONT_HEADER: &[&str] = &[
        "# SENSE font settings",
        "# FONT=\"\" uses the default font; relative paths start at the game directory",
    ];

    /// Header written at the top of decor.cfg
    pub const DECOR_HEADER: &[&str] = &["# SENSE standard decorations (true = shown)"];
}

/// Decoration naming rules
pub mod decor {
    /// Characters that cannot appear in a file name on any supported platform
    pub const UNSAFE_NAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

    /// Replacement for unsafe characters
    pub const NAME_REPLACEMENT: char = '_';

    /// Name used when sanitizing leaves nothing
    pub const FALLBACK_NAME: &str = "unknown";

    /// Suffix appended on name collision (`_new`, `_new2`, `_new3`, ...)
    pub const COLLISION_SUFFIX: &str = "_new";

    /// Built-in decorations the game ships with, all enabled by default
    pub const STANDARD_DECOR: &[&str] = &[
        "grass",
        "flower1",
        "flower2",
        "flower3",
        "flower4",
        "smallrock1",
        "smallrock2",
        "smallrock3",
    ];
}

/// Font setting keys, defaults and validation bounds
pub mod font {
    pub const FONT_KEY: &str = "FONT";
    pub const FONT_SIZE_KEY: &str = "FONT_SIZE";
    pub const OTHER_TEXT_FONT_SIZE_KEY: &str = "OTHER_TEXT_FONT_SIZE";

    /// Default main text size in points
    pub const DEFAULT_FONT_SIZE: u32 = 24;

    /// Default secondary text size in points
    pub const DEFAULT_OTHER_TEXT_FONT_SIZE: u32 = 48;

    /// Smallest size the game renders
    pub const MIN_FONT_SIZE: u32 = 1;

    /// Largest size the editor offers
    pub const MAX_FONT_SIZE: u32 = 100;
}

/// Built-in localization strings, in the order the game lists them
pub mod localization {
    pub const IDLE_TEXT: &str = "Instructions:

Keyboard:
    \u{2022} Press A (or the Left Arrow key) and D (or the Right Arrow key) alternately to move.
    \u{2022} Press the Spacebar to enable or disable Endless Mode (only before you start moving).
    \u{2022} Press the Escape key to exit the game.
    \u{2022} Press F to switch between windowed and fullscreen mode.

Gamepad:
    \u{2022} Press Left or Right on the Directional Pad (or the X / B buttons) alternately to move.
    \u{2022} Press the A button to enable or disable Endless Mode (only before you start moving).
    \u{2022} Press the Start button to exit the game.
    \u{2022} Press the Y button to switch between windowed and fullscreen mode.

Touchscreen:
    \u{2022} Tap the left and right sides of the screen alternately to move.
    \u{2022} Hold two fingers on the screen for two seconds to enable or disable Endless Mode (only before you start moving).

\u{2022} Cross the center mark to begin moving.
\u{2022} After crossing the center, maintain your balance \u{2014} do not allow the pointer to touch the red zone, or you will lose.
";

    pub const DEFAULTS: &[(&str, &str)] = &[
        ("LOADING_TEXT", "Loading..."),
        ("ENDLESS_MODE", "ENDLESS MODE"),
        ("IDLE", IDLE_TEXT),
        ("A_START", "You opened your eyes, but did you see anything new?"),
        ("B_START", "Every day is like the one before, yet you search for differences"),
        ("C_START", "People chase dreams, but who said dreams hold value?"),
        ("D_START", "How many questions have you asked, and how many answers have you received?"),
        ("E_START", "The world moves in circles, but where is its beginning and where is its end?"),
        ("F_START", "You strive to find a purpose, but what is it even for?"),
        ("G_START", "Stones lie on the ground for millennia, yet you live for only a moment."),
        ("H_START", "What matters more: your thoughts or the sound of the wind?"),
        ("I_START", "The history of the world is full of heroes, but no one remembers them."),
        ("J_START", "If something disappears tomorrow, what changes today?"),
        ("K_START", "The sun rises every day, but not for you."),
        ("L_START", "Your heart beats, but who cares?"),
        ("M_START", "Everything you build will one day turn to dust."),
        ("N_START", "You search for truth, but in this world, there is no law of truth."),
        ("O_START", "You search for gods, but there are none."),
        ("P_START", "Joy and pain alternate, but both eventually fade."),
        ("Q_START", "You want to be needed, but by whom?"),
        ("R_START", "The stars shine, but not to show you the way."),
        ("S_START", "Eternity is a word that both frightens and frees."),
        ("T_START", "In this chaos, you seek meaning, but chaos demands no explanation."),
        ("FINAL_START", "THE UNIVERSE DOESN'T MAKE SENSE."),
    ];
}
