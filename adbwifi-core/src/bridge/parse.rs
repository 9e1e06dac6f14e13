//! Parser for `adb devices` output
//!
//! The format is a header line followed by `serial<whitespace>state`
//! lines. It is not a versioned contract, so parsing is deliberately
//! forgiving: header drift is logged, malformed lines are skipped, and
//! unknown state tokens normalize to [`DeviceState::Other`].

use tracing::{debug, warn};

/// Expected first line of `adb devices` output
const DEVICES_HEADER: &str = "List of devices attached";

/// Connection state reported for one device line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Connected and authorized
    Device,
    /// Known but unreachable
    Offline,
    /// Connected but not authorized on the device
    Unauthorized,
    /// Any state token this version does not recognize
    Other,
}

impl DeviceState {
    /// Normalize a state token
    fn parse(token: &str) -> Self {
        match token {
            "device" => Self::Device,
            "offline" => Self::Offline,
            "unauthorized" => Self::Unauthorized,
            _ => Self::Other,
        }
    }
}

/// One parsed line of `adb devices` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    /// Device IP address
    pub address: String,
    /// Device TCP port
    pub port: String,
    /// Reported connection state
    pub state: DeviceState,
}

/// Parse `adb devices` output into device records
///
/// Never fails on arbitrary input. Lines that do not match the two-field
/// `addr:port state` shape are excluded; USB serials (no `addr:port`)
/// are excluded the same way.
pub fn parse_devices(text: &str) -> Vec<DeviceRecord> {
    let mut lines = text.lines();

    match lines.next() {
        Some(header) if header.trim() == DEVICES_HEADER => {}
        Some(header) => warn!(header = %header, "Unexpected header from 'adb devices'"),
        None => return Vec::new(),
    }

    let mut records = Vec::new();
    for line in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 {
            if !line.trim().is_empty() {
                debug!(line = %line, "Skipping malformed device line");
            }
            continue;
        }

        let serial: Vec<&str> = fields[0].split(':').collect();
        if serial.len() != 2 || serial[0].is_empty() || serial[1].is_empty() {
            debug!(line = %line, "Skipping non-TCP device line");
            continue;
        }

        records.push(DeviceRecord {
            address: serial[0].to_string(),
            port: serial[1].to_string(),
            state: DeviceState::parse(fields[1]),
        });
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_connected_device() {
        let records = parse_devices("List of devices attached \n192.168.1.5:5555\tdevice\n");

        assert_eq!(
            records,
            vec![DeviceRecord {
                address: "192.168.1.5".into(),
                port: "5555".into(),
                state: DeviceState::Device,
            }]
        );
    }

    #[test]
    fn test_parse_offline_device() {
        let records = parse_devices("List of devices attached \n192.168.1.5:5555\toffline\n");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].state, DeviceState::Offline);
    }

    #[test]
    fn test_parse_unauthorized_device() {
        let records = parse_devices("List of devices attached\n10.0.0.2:5555\tunauthorized\n");

        assert_eq!(records[0].state, DeviceState::Unauthorized);
    }

    #[test]
    fn test_parse_unknown_state_maps_to_other() {
        let records = parse_devices("List of devices attached\n10.0.0.2:5555\trecovery\n");

        assert_eq!(records[0].state, DeviceState::Other);
    }

    #[test]
    fn test_parse_multiple_devices() {
        let text = "List of devices attached\n\
                    192.168.1.5:5555\tdevice\n\
                    192.168.1.6:5555\toffline\n";
        let records = parse_devices(text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].address, "192.168.1.5");
        assert_eq!(records[1].state, DeviceState::Offline);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_devices("").is_empty());
    }

    #[test]
    fn test_parse_header_only() {
        assert!(parse_devices("List of devices attached \n").is_empty());
    }

    #[test]
    fn test_parse_unexpected_header_is_tolerated() {
        // Header drift is a warning, not a failure; the device lines
        // after it still parse.
        let records = parse_devices("* daemon started successfully *\n192.168.1.5:5555\tdevice\n");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].address, "192.168.1.5");
    }

    #[test]
    fn test_parse_skips_usb_serial() {
        let text = "List of devices attached\n\
                    0123456789ABCDEF\tdevice\n\
                    192.168.1.5:5555\tdevice\n";
        let records = parse_devices(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].address, "192.168.1.5");
    }

    #[test]
    fn test_parse_skips_wrong_field_count() {
        let text = "List of devices attached\n\
                    192.168.1.5:5555\tdevice\textra\n\
                    justoneword\n";

        assert!(parse_devices(text).is_empty());
    }

    #[test]
    fn test_parse_skips_empty_serial_parts() {
        let text = "List of devices attached\n\
                    :5555\tdevice\n\
                    192.168.1.5:\tdevice\n";

        assert!(parse_devices(text).is_empty());
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let text = "List of devices attached\n\n192.168.1.5:5555\tdevice\n\n";
        let records = parse_devices(text);

        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_never_panics_on_garbage() {
        for garbage in [
            "\0\0\0",
            "::::\t::::\n:::",
            "List of devices attached\n\t\n \t \n::\t::",
            "no header at all, just prose text\nwith several lines\n",
        ] {
            let _ = parse_devices(garbage);
        }
    }
}
