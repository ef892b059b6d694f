/// Normalize a submitted choice value: trim, lowercase, `_` and spaces become `-`.
pub fn normalize_choice(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c.is_whitespace() { '-' } else { c })
        .collect()
}

/// Lookup surface shared by every enum declared with `choice_enum!`.
pub(crate) trait Choice: Copy + Eq + std::hash::Hash + 'static {
    fn parse(raw: &str) -> Option<Self>;
    fn wire(&self) -> &'static str;
}

/// Declares a string-backed enumeration of form/status choices.
///
/// Each variant has a canonical wire value (already normalized) and optional
/// aliases. `from_str_loose` normalizes its input before matching and returns
/// `None` for anything unmapped.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire $(, alias = $alias)*)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            pub fn from_str_loose(s: &str) -> Option<Self> {
                match $crate::choice::normalize_choice(s).as_str() {
                    $($wire $(| $alias)* => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl $crate::choice::Choice for $name {
            fn parse(raw: &str) -> Option<Self> {
                $name::from_str_loose(raw)
            }

            fn wire(&self) -> &'static str {
                self.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}
