use attitude_config::AppConfig;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Serial port of the sensor (defaults to the last one used, then the first found)
    #[arg(short, long)]
    pub port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Display refresh period in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// List available serial ports and exit
    #[arg(long)]
    pub list_ports: bool,
}

impl Args {
    /// Command-line values take precedence over the config file.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(port) = &self.port {
            config.serial.port = Some(port.clone());
        }
        if let Some(baud) = self.baud {
            config.serial.baud_rate = baud;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.render.tick_interval_ms = tick_ms;
        }
    }
}
