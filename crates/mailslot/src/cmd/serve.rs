use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mailslot_core::{RelayConfig, SlotRegistry};
use mailslot_remote::RelayServer;

use crate::cmd::ServeArgs;
use crate::exit::{remote_error, CliError, CliResult, FAILURE, SUCCESS};

pub fn run(args: ServeArgs) -> CliResult<i32> {
    let config = RelayConfig {
        message_capacity: args.capacity,
        max_instances: args.max_instances,
    };
    let registry = SlotRegistry::new(config)
        .map_err(|err| CliError::new(FAILURE, format!("invalid configuration: {err}")))?;

    let server = RelayServer::bind(&args.path, Arc::new(registry))
        .map_err(|err| remote_error("bind failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let result = server.run(&running);

    // Last registry operation before exit; sessions still connected die
    // with the process.
    server.registry().teardown_all();
    result.map_err(|err| remote_error("serve failed", err))?;
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(FAILURE, format!("signal handler setup failed: {err}")))
}
