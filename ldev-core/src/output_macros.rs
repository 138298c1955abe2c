//! Output macros for the ldev CLI.
//!
//! Command results go to stdout through `ldev_println!`; status and
//! diagnostics go to stderr so piped output stays clean.

#[macro_export]
macro_rules! ldev_print {
    ($($arg:tt)*) => {
        print!("{}", format!($($arg)*));
    }
}

#[macro_export]
macro_rules! ldev_println {
    () => {
        println!();
    };
    ($($arg:tt)*) => {
        println!("{}", format!($($arg)*));
    }
}

#[macro_export]
macro_rules! ldev_error {
    ($($arg:tt)*) => {
        eprintln!("❌ {}", format!($($arg)*));
    }
}

#[macro_export]
macro_rules! ldev_error_hint {
    ($($arg:tt)*) => {
        eprintln!("💡 {}", format!($($arg)*));
    };
}

#[macro_export]
macro_rules! ldev_success {
    ($($arg:tt)*) => {
        eprintln!("✓ {}", format!($($arg)*));
    };
}

#[macro_export]
macro_rules! ldev_info {
    ($($arg:tt)*) => {
        eprintln!("ℹ {}", format!($($arg)*));
    };
}

#[macro_export]
macro_rules! ldev_warning {
    ($($arg:tt)*) => {
        eprintln!("⚠ {}", format!($($arg)*));
    };
}
