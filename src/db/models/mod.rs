//! Row and payload types for every table the service owns.

/// A stored or submitted value that is not one of an enum's allowed spellings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} value '{value}', must be one of: {allowed}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub allowed: String,
}

/// Declares a closed set of values persisted as TEXT and exchanged as JSON
/// strings. Each variant carries its exact wire spelling.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
        $vis enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::db::models::UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $( $text => Ok($name::$variant), )+
                    other => Err($crate::db::models::UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                        allowed: [$( $text ),+].join(", "),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::db::models::UnknownVariant;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

pub mod department;
pub mod employee;
pub mod requests;
pub mod workflow;

#[cfg(test)]
mod tests {
    use super::employee::EmployeeStatus;
    use super::workflow::WorkflowStatus;

    #[test]
    fn new_rows_default_to_their_initial_status() {
        assert_eq!(EmployeeStatus::default(), EmployeeStatus::Active);
        assert_eq!(WorkflowStatus::default(), WorkflowStatus::Pending);
        assert_eq!(WorkflowStatus::default().to_string(), "Pending");
    }
}
