//! Macros for defining kind enums.

/// Macro for defining a kind enum stored as `INT2` and named in
/// `SCREAMING_SNAKE_CASE`.
///
/// # Example
///
/// ```rust
/// use common::define_kind;
///
/// define_kind! {
///     #[doc = "Kind of a document."]
///     enum Kind {
///         #[doc = "Paper document."]
///         Paper = 1,
///
///         #[doc = "Scanned copy of a paper document."]
///         ScannedCopy = 2,
///     }
/// }
/// ```
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            Eq,
            PartialEq,
        )]
        #[cfg_attr(
            feature = "serde",
            derive(
                $crate::private::serde::Deserialize,
                $crate::private::serde::Serialize,
            ),
            serde(rename_all = "SCREAMING_SNAKE_CASE"),
        )]
        #[doc = $doc]
        #[repr(u8)]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $(
                 #[doc = $variant_doc]
                 $variant = $value,
            )*
        }

        impl $name {
            /// Converts this into its [`u8`] representation.
            #[must_use]
            pub const fn u8(self) -> u8 {
                self as u8
            }
        }

        impl ::core::convert::TryFrom<u8> for $name {
            type Error = u8;

            fn try_from(v: u8) -> Result<Self, u8> {
                match v {
                    $(
                        v if Self::$variant.u8() == v => Ok(Self::$variant),
                    )*
                    v => Err(v),
                }
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            $crate::private::postgres_types::accepts!(INT2);

            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &[u8],
            ) -> Result<
                $name,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                Self::try_from(u8::try_from(i16::from_sql(ty, raw)?)?)
                    .map_err(|v| ::std::format!(
                        "invalid `{}` value: {v}",
                        ::core::stringify!($name),
                    ).into())
            }
        }

        #[cfg(feature = "postgres")]
        impl $crate::private::postgres_types::ToSql for $name {
            $crate::private::postgres_types::accepts!(INT2);
            $crate::private::postgres_types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &$crate::private::postgres_types::Type,
                w: &mut $crate::private::postgres_types::private::BytesMut,
            ) -> Result<
                $crate::private::postgres_types::IsNull,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                i16::from(self.u8()).to_sql(ty, w)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    crate::define_kind! {
        #[doc = "Kind of a test document."]
        enum Sample {
            #[doc = "Paper document."]
            Paper = 1,

            #[doc = "Scanned document."]
            ScannedCopy = 2,
        }
    }

    #[test]
    fn converts_to_and_from_u8() {
        assert_eq!(Sample::ScannedCopy.u8(), 2);
        assert_eq!(Sample::try_from(1), Ok(Sample::Paper));
        assert_eq!(Sample::try_from(3), Err(3));
    }

    #[test]
    fn uses_screaming_snake_case_names() {
        assert_eq!(Sample::ScannedCopy.to_string(), "SCANNED_COPY");
        assert_eq!("PAPER".parse::<Sample>(), Ok(Sample::Paper));
        assert!("paper".parse::<Sample>().is_err());
    }
}
