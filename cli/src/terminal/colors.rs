use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 140, g: 220, b: 150 };
pub const ACCENT: Color = Color::TrueColor { r: 250, g: 190, b: 90 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 215, g: 215, b: 215 };

pub const SEVERITY_INFO: Color = Color::Cyan;
pub const SEVERITY_LOW: Color = Color::Green;
pub const SEVERITY_MEDIUM: Color = Color::Yellow;
pub const SEVERITY_HIGH: Color = Color::TrueColor { r: 255, g: 135, b: 60 };
pub const SEVERITY_CRITICAL: Color = Color::Red;
