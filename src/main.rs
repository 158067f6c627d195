// the binary only mounts the app; the library owns the dependencies
#![allow(unused_crate_dependencies)]

use ecosystem_canvas::{App, init_logging};

fn main() {
	init_logging();
	leptos::mount::mount_to_body(App)
}
