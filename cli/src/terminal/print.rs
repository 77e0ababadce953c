use std::fmt::Display;

use crate::terminal::colors;
use colored::*;
use tracing::info;
use unicode_width::UnicodeWidthStr;

pub const TOTAL_WIDTH: usize = 64;

/// Target of events that are printed verbatim by the formatter.
pub const PRINT_TARGET: &str = "crowscout::print";

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub trait WithDefaultColor {
    fn with_default(self, default_color: Color) -> ColoredString;
}

impl WithDefaultColor for &str {
    fn with_default(self, default_color: Color) -> ColoredString {
        self.color(default_color)
    }
}

impl WithDefaultColor for String {
    fn with_default(self, default_color: Color) -> ColoredString {
        self.color(default_color)
    }
}

impl WithDefaultColor for ColoredString {
    fn with_default(self, _default_color: Color) -> ColoredString {
        self
    }
}

pub fn print(msg: &str) {
    info!(target: "crowscout::print", raw_msg = msg);
}

const BANNER: &str = r#"
      ____                    ____                  _
     / ___|_ __ _____      __/ ___|  ___ ___  _   _| |_
    | |   | '__/ _ \ \ /\ / /\___ \ / __/ _ \| | | | __|
    | |___| | | (_) \ V  V /  ___) | (_| (_) | |_| | |_
     \____|_|  \___/ \_/\_/  |____/ \___\___/ \__,_|\__|
"#;

pub fn banner(no_banner: bool, q_level: u8) {
    if no_banner || q_level > 0 {
        return;
    }

    let text_content: String = format!("⟦ CROWSCOUT v{} ⟧ ", env!("CARGO_PKG_VERSION"));
    let text_width: usize = UnicodeWidthStr::width(text_content.as_str());
    let text: ColoredString = text_content.bright_green().bold();
    let sep: ColoredString = "═".repeat((TOTAL_WIDTH.saturating_sub(text_width)) / 2).bright_black();
    let output: String = format!("{}{}{}", sep, text, sep);

    print(&format!("{}", BANNER.color(colors::PRIMARY).bold()));
    print(&output);
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }

    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    print(&format!("{}", sep));
}

pub fn aligned_line<V>(key: &str, value: V, key_width: usize)
where
    V: Display + WithDefaultColor,
{
    let whitespace: String = ".".repeat((key_width + 1).saturating_sub(key.len()));
    let colon: String = format!(
        "{}{}",
        whitespace.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR)
    );
    let value: ColoredString = value.with_default(colors::TEXT_DEFAULT);
    print_status(format!("{}{} {}", key.color(colors::PRIMARY), colon, value));
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    let prefix: ColoredString = ">".color(colors::SEPARATOR);
    let message: String = format!("{} {}", prefix, msg.as_ref().color(colors::TEXT_DEFAULT));
    print(&message);
}

pub fn host_head(host: &str, is_waf: bool) {
    let waf: ColoredString = if is_waf {
        "WAF".yellow().bold()
    } else {
        "no WAF".color(colors::SEPARATOR)
    };
    let output: String = format!(
        "{} {} {}",
        "[»]".color(colors::ACCENT),
        host.color(colors::PRIMARY).bold(),
        format!("({waf})").color(colors::SEPARATOR)
    );
    print(&output);
}

/// Prints `lines` as the branches of a one-level tree.
pub fn as_tree_one_level(lines: &[String]) {
    for (i, line) in lines.iter().enumerate() {
        let last: bool = i + 1 == lines.len();
        let branch: ColoredString = if !last {
            "├─".bright_black()
        } else {
            "└─".bright_black()
        };
        print(&format!(" {} {}", branch, line));
    }
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}{}", space, msg, space));
}

const NO_RESULTS_0: &str = r#"
         _   _  ___    _____  _    ____   ____ _____ _____ ____
        | \ | |/ _ \  |_   _|/ \  |  _ \ / ___| ____|_   _/ ___|
        |  \| | | | |   | | / _ \ | |_) | |  _|  _|   | | \___ \
        | |\  | |_| |   | |/ ___ \|  _ <| |_| | |___  | |  ___) |
        |_| \_|\___/    |_/_/   \_\_| \_\\____|_____| |_| |____/
"#;

pub fn no_results(q_level: u8) {
    if q_level > 0 {
        return;
    }
    print(&format!("{}", NO_RESULTS_0.red().bold()));
}

pub fn end_of_program() {
    print(&format!(
        "{}",
        "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR)
    ));
}
