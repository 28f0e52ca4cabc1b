use mailslot_remote::RelayClient;

use crate::cmd::ReadArgs;
use crate::exit::{remote_error, CliResult, SUCCESS};
use crate::output::print_message;

pub fn run(args: ReadArgs) -> CliResult<i32> {
    let mut client = RelayClient::open(&args.path, args.instance)
        .map_err(|err| remote_error("open failed", err))?;

    client
        .select(args.channel)
        .map_err(|err| remote_error("select failed", err))?;

    let message = client
        .recv(args.max_len)
        .map_err(|err| remote_error("read failed", err))?;

    print_message(args.instance, args.channel, &message, args.format);
    Ok(SUCCESS)
}
