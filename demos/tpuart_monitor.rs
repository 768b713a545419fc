use anyhow::{bail, Context, Result};
use knx_tpuart::transport::open_serial;
use knx_tpuart::{Command, Event, GroupAddress, IndividualAddress, TpUart};

fn parse_parts<const N: usize>(text: &str, sep: char) -> Result<[u8; N]> {
    let mut parts = [0; N];
    let mut fields = text.split(sep);
    for part in parts.iter_mut() {
        *part = fields
            .next()
            .with_context(|| format!("Too few fields in {}", text))?
            .parse()
            .with_context(|| format!("Bad number in {}", text))?;
    }
    if fields.next().is_some() {
        bail!("Too many fields in {}", text);
    }
    Ok(parts)
}

fn parse_individual(text: &str) -> Result<IndividualAddress> {
    let [area, line, member] = parse_parts(text, '.')?;
    Ok(IndividualAddress::new(area, line, member)?)
}

fn parse_group(text: &str) -> Result<GroupAddress> {
    let [main, middle, sub] = parse_parts(text, '/')?;
    Ok(GroupAddress::new(main, middle, sub)?)
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args();
    args.next(); // Skip program name
    let port = args.next().unwrap_or_else(|| "/dev/ttyAMA0".to_string());
    let address = parse_individual(&args.next().unwrap_or_else(|| "1.1.250".to_string()))?;

    let serial = open_serial(&port).with_context(|| format!("Failed to open {}", port))?;
    let mut tpuart = TpUart::new(serial, address);
    for group in args {
        tpuart.add_listen_group_address(parse_group(&group)?)?;
    }
    tpuart.set_listen_to_broadcasts(true);
    tpuart.reset_request()?;

    println!("Listening as {} on {}", address, port);
    loop {
        match tpuart.poll()? {
            Event::TelegramReceived => {
                let tg = tpuart.received_telegram();
                println!("{}", tg);
                if tg.is_broadcast() && tg.command() == Command::IndividualAddressRequest {
                    println!("Answered address read: {:?}", tpuart.individual_answer_address()?);
                }
            }
            Event::IrrelevantTelegram => {
                println!("(other) {:?}", tpuart.received_telegram());
            }
            Event::ResetIndication => println!("Transceiver reset"),
            Event::ReceiveTimeout { received } => {
                println!("Incomplete telegram, {} bytes", received)
            }
            Event::Unknown(Some(byte)) => println!("Transceiver status {:#04x}", byte),
            Event::Unknown(None) => std::thread::sleep(std::time::Duration::from_millis(1)),
        }
    }
}
