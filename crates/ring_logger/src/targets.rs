use std::io::Write;

/// Destination the dispatcher hands rendered records to. Only the dispatcher
/// thread ever calls it, hence `&mut self`.
pub trait LogTarget {
    fn log(&mut self,
           message: &str
    );
}

/// Used when the logger runs without file backing.
pub struct ConsoleLogTarget;

impl LogTarget for ConsoleLogTarget {
    fn log(&mut self,
           message: &str
    ) {
        let mut stdout = std::io::stdout().lock();
        let result = stdout.write_all(message.as_bytes()).and_then(|_| stdout.flush());
        if let Err(err) = result {
            eprintln!("ring_logger: failed to write to stdout: {}", err);
        }
    }
}
