//! Navigation query resolution. Offline.

use ispdesk_core::Navigation;

use crate::cli::{GlobalOpts, NavArgs};
use crate::error::CliError;
use crate::output;

fn detail(nav: &Navigation) -> String {
    output::detail_block(&[
        ("View", nav.view.to_string()),
        ("Tab", nav.tab.to_string()),
        ("Portal", nav.portal.to_string()),
        ("Queue", nav.queue.to_string()),
        ("Query", nav.to_query()),
    ])
}

pub fn handle(args: &NavArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let nav = Navigation::from_query(&args.query);
    let out = output::render_single(global.format(), &nav, detail, Navigation::to_query)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
