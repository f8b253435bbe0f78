use nu_plugin::{serve_plugin, MsgPackSerializer};
use nu_plugin_siteplan::{logging, SiteplanPlugin};

fn main() {
    // stdout carries the plugin protocol; warnings still reach stderr
    logging::init_tracing(0);
    serve_plugin(&SiteplanPlugin, MsgPackSerializer {})
}
