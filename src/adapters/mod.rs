//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter         | Implements   | Connects to                      |
//! |-----------------|--------------|----------------------------------|
//! | `console_touch` | TouchInput   | Line-oriented stdin              |
//! | `i2c`           | BusProvider  | `/dev/i2c-N` or in-memory bus    |
//! | `log_sink`      | EventSink    | `log` at info (`TX:` JSON lines) |
//! | `signals`       | —            | SIGINT / SIGTERM → shutdown      |

pub mod console_touch;
pub mod i2c;
pub mod log_sink;
pub mod signals;
