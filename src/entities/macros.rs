//! Macros for reducing boilerplate when defining records
//!
//! Concrete record types are plain serde structs. These macros generate the
//! repetitive parts of their [`Record`](crate::core::entity::Record)
//! implementation.

/// Implement `Record` for a struct with `id: Uuid` and a `status` field
///
/// The listed fields become reachable through `field_value` by name; each
/// field type needs a `From<T> for FieldValue` conversion. Capability
/// overrides (natural key, status transitions, rules, hooks) go in the
/// optional trailing block.
///
/// The status type must provide `fn as_str(&self) -> &str`.
///
/// # Example
/// ```rust,ignore
/// impl_record!(Product, "products", fields: [sku, name, price, status], {
///     fn natural_key_field() -> Option<&'static str> {
///         Some("sku")
///     }
/// });
/// ```
#[macro_export]
macro_rules! impl_record {
    (
        $type:ident, $resource:literal,
        fields: [$($field:ident),* $(,)?]
        $(, { $($extra:tt)* })?
    ) => {
        impl $crate::core::entity::Record for $type {
            fn resource_name() -> &'static str {
                $resource
            }

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn set_id(&mut self, id: ::uuid::Uuid) {
                self.id = id;
            }

            fn status(&self) -> &str {
                self.status.as_str()
            }

            fn field_value(&self, field: &str) -> Option<$crate::core::field::FieldValue> {
                match field {
                    "id" => Some($crate::core::field::FieldValue::Uuid(self.id)),
                    $(
                        stringify!($field) => Some($crate::core::field::FieldValue::from(
                            self.$field.clone(),
                        )),
                    )*
                    _ => None,
                }
            }

            $($($extra)*)?
        }
    };
}

/// Implement `as_str`, `Display` and `FieldValue` conversion for a status enum
///
/// # Example
/// ```rust,ignore
/// impl_status!(ProductStatus {
///     Active => "active",
///     Inactive => "inactive",
/// });
/// ```
#[macro_export]
macro_rules! impl_status {
    ($type:ident { $($variant:ident => $text:literal),* $(,)? }) => {
        impl $type {
            /// Every status, in declaration order
            pub const ALL: &'static [$type] = &[$($type::$variant),*];

            /// Wire string of the status
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($type::$variant => $text,)*
                }
            }
        }

        impl ::std::fmt::Display for $type {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $type {
            type Err = $crate::core::error::ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($type::$variant),)*
                    other => Err($crate::core::error::ValidationError::field(
                        "status",
                        format!("unknown status '{}'", other),
                    )),
                }
            }
        }

        impl From<$type> for $crate::core::field::FieldValue {
            fn from(value: $type) -> Self {
                $crate::core::field::FieldValue::String(value.as_str().to_string())
            }
        }
    };
}
