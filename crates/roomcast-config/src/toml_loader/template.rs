//! Default TOML config template with inline documentation comments.

pub(crate) fn default_config_toml() -> &'static str {
    r##"# Roomcast Configuration
# Only override what you want to change -- missing fields use defaults.

[relay]
# bind = "0.0.0.0"
# port = 3000                       # 1-65535
# outbound_queue_capacity = 256     # 1-65536, oldest audio frame dropped when full

[rooms]
# code_length = 6                   # 3-32

[sync]
# buffer_floor_ms = 100.0           # 0-10000
# buffer_margin = 1.5               # 1.0-10.0

[playback]
# stall_threshold_ms = 500          # 1-60000
# lookahead_ms = 50                 # 0-5000
# volume = 80                       # 0-100

[client]
# connect_timeout_secs = 20         # 1-300
# reconnect_attempts = 5            # 0-100
# reconnect_delay_ms = 1000         # 1-60000, doubles per failure
# max_reconnect_delay_ms = 5000     # 1-300000

[logging]
level = "info"                      # trace | debug | info | warn | error
"##
}
