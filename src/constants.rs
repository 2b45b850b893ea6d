//! Common constants used throughout Phos.

/// Supported recipe file names, tried in order.
pub const RECIPE_FILES: [&str; 3] = ["phos.json", "phos.yml", "phos.yaml"];

/// Default template subdirectory of a template root that carries a recipe.
pub const DEFAULT_TEMPLATE_DIR: &str = "template";

/// File name suffixes copied byte for byte instead of being rendered.
pub const BINARY_EXTENSIONS: [&str; 22] = [
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".webp", ".woff", ".woff2", ".ttf",
    ".otf", ".eot", ".pdf", ".zip", ".tar", ".gz", ".7z", ".bin", ".exe", ".dll", ".so",
    ".dylib",
];
