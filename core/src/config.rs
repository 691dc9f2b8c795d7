/// Configuration for the bridge binary
use crate::error::{ChatError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

const DEFAULT_NOTIFY_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// End-user session: guided flow plus summary side-flow.
    User,
    /// Agent console: multiplexes every end-user conversation.
    Console,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the transport bridge listens on
    pub listen_addr: SocketAddr,

    /// Session flavor hosted behind the bridge
    pub role: Role,

    /// Display name announced at registration
    pub display_name: String,

    /// Capacity of the state-change broadcast channel
    pub notify_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:7600".parse().unwrap(),
            role: Role::User,
            display_name: "Guest".to_string(),
            notify_capacity: DEFAULT_NOTIFY_CAPACITY,
        }
    }
}

impl Config {
    /// Create config from command line arguments
    pub fn from_args(args: &[String]) -> Result<Self> {
        if args.len() < 2 {
            return Err(ChatError::Config(format!(
                "Usage: {} <port> [--role user|console] [--name <display_name>]",
                args.first().map(String::as_str).unwrap_or("core")
            )));
        }

        let port = args[1]
            .parse::<u16>()
            .map_err(|_| ChatError::Config("Port must be a valid number (0-65535)".to_string()))?;
        let listen_addr = format!("127.0.0.1:{}", port)
            .parse()
            .map_err(|_| ChatError::Config("Invalid listen address".to_string()))?;

        let mut role = Role::User;
        let mut display_name: Option<String> = None;

        let mut i = 2;
        while i < args.len() {
            match args[i].as_str() {
                "--role" => {
                    let value = args.get(i + 1).ok_or_else(|| {
                        ChatError::Config("--role requires user or console".to_string())
                    })?;
                    role = parse_role(value)?;
                    i += 2;
                }
                "--name" => {
                    let value = args.get(i + 1).ok_or_else(|| {
                        ChatError::Config("--name requires a display name".to_string())
                    })?;
                    display_name = Some(value.clone());
                    i += 2;
                }
                other => {
                    return Err(ChatError::Config(format!("Unknown argument: {}", other)));
                }
            }
        }

        // Env overrides (nice for scripts)
        if let Ok(value) = std::env::var("GUIDECHAT_ROLE") {
            role = parse_role(&value)?;
        }
        if let Ok(value) = std::env::var("GUIDECHAT_NAME") {
            display_name = Some(value);
        }

        Ok(Self {
            listen_addr,
            role,
            display_name: display_name.unwrap_or_else(|| "Guest".to_string()),
            ..Default::default()
        })
    }
}

fn parse_role(value: &str) -> Result<Role> {
    match value {
        "user" => Ok(Role::User),
        "console" => Ok(Role::Console),
        other => Err(ChatError::Config(format!(
            "Unknown role: {} (expected user or console)",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_args_parses_port_role_and_name() {
        let args: Vec<String> = ["core", "7601", "--role", "console", "--name", "Front desk"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let config = Config::from_args(&args).unwrap();
        assert_eq!(config.listen_addr.port(), 7601);
        assert_eq!(config.role, Role::Console);
        assert_eq!(config.display_name, "Front desk");
    }

    #[test]
    fn bad_role_is_a_config_error() {
        let args: Vec<String> = ["core", "7601", "--role", "spectator"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(Config::from_args(&args).is_err());
    }
}
