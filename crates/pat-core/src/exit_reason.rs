use std::fmt;

macro_rules! define_exit_reasons {
    ($($variant:ident => ($code:expr, $name:expr)),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        /// Fatal conditions that terminate a pat-helper run, each with its own exit code.
        pub enum ExitReason {
            $($variant,)+
        }

        impl ExitReason {
            pub const ALL: &'static [ExitReason] = &[$(ExitReason::$variant,)+];

            /// Process exit status reported to the invoking pipeline.
            pub fn code(self) -> u8 {
                match self {
                    $(ExitReason::$variant => $code,)+
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $(ExitReason::$variant => $name,)+
                }
            }
        }
    };
}

define_exit_reasons! {
    MissingConfiguration => (255, "missing_configuration"),
    InvalidConfiguration => (254, "invalid_configuration"),
    AttemptsExhausted => (127, "attempts_exhausted"),
    DirectoryBindExhausted => (126, "directory_bind_exhausted"),
    ClientSetup => (64, "client_setup"),
    IssueUnexpectedStatus => (63, "issue_unexpected_status"),
    RevokeUnexpectedStatus => (62, "revoke_unexpected_status"),
    OutputUnavailable => (61, "output_unavailable"),
    UndecodableBody => (32, "undecodable_body"),
    MissingToken => (31, "missing_token"),
    MissingId => (30, "missing_id"),
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
