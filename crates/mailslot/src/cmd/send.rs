use mailslot_remote::RelayClient;

use crate::cmd::SendArgs;
use crate::exit::{remote_error, CliResult, SUCCESS};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let mut client = RelayClient::open(&args.path, args.instance)
        .map_err(|err| remote_error("open failed", err))?;

    client
        .select(args.channel)
        .map_err(|err| remote_error("select failed", err))?;

    let accepted = client
        .send(args.message.as_bytes())
        .map_err(|err| remote_error("send failed", err))?;

    tracing::info!(
        instance = args.instance,
        channel = args.channel,
        bytes = accepted,
        "message sent"
    );
    Ok(SUCCESS)
}
