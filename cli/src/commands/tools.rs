use colored::*;
use crowscout_core::tools::Tool;

use crate::terminal::{colors, print};

pub fn tools() {
    let width: usize = Tool::ALL.iter().map(|t| t.binary().len()).max().unwrap_or(0);
    let mut missing: usize = 0;

    for tool in Tool::ALL {
        let status: ColoredString = match tool.locate() {
            Some(path) => format!("{} ({})", path.display(), tool.purpose()).color(colors::TEXT_DEFAULT),
            None => {
                missing += 1;
                format!("missing ({})", tool.purpose()).red().bold()
            }
        };
        print::aligned_line(tool.binary(), status, width);
    }

    print::fat_separator();
    if missing == 0 {
        print::centerln(&format!("{}", "All tools available".green().bold()));
    } else {
        let stages: ColoredString = format!("{missing} missing").yellow().bold();
        print::centerln(&format!("{stages}: affected stages will fall back or fail"));
    }
}
