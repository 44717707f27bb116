/// Implement [`Record`](crate::record::Record) for a struct by listing the
/// fields that receive column values.
///
/// Each listed field takes the column with the same name, or the column given
/// after `=`. Fields are converted with
/// [`FromRowValue`](crate::types::FromRowValue), so their declared type decides
/// what a column may hold. Embedded records listed under `parents` are searched
/// after the struct's own fields, in the order given; the first field that
/// claims a column gets it. The struct is built with `Default::default()`.
///
/// ```rust
/// use sql_session::impl_record;
///
/// #[derive(Debug, Default)]
/// struct Audit {
///     last_update: Option<String>,
/// }
/// impl_record!(Audit { last_update });
///
/// #[derive(Debug, Default)]
/// struct Actor {
///     actor_id: i64,
///     first_name: String,
///     surname: String,
///     audit: Audit,
/// }
/// impl_record!(Actor {
///     actor_id,
///     first_name,
///     surname = "last_name",
/// } parents {
///     audit: Audit,
/// });
/// ```
#[macro_export]
macro_rules! impl_record {
    (@column $field:ident = $column:literal) => {
        $column
    };
    (@column $field:ident) => {
        stringify!($field)
    };
    (
        $record:ty {
            $($field:ident $(= $column:literal)?),* $(,)?
        }
        $(parents {
            $($parent:ident : $parent_ty:ty),* $(,)?
        })?
    ) => {
        impl $crate::record::Record for $record {
            fn construct() -> ::std::result::Result<Self, $crate::error::SqlSessionError> {
                ::std::result::Result::Ok(<Self as ::std::default::Default>::default())
            }

            fn assign(
                &mut self,
                column: &str,
                value: &$crate::types::RowValues,
            ) -> ::std::result::Result<bool, $crate::error::SqlSessionError> {
                $(
                    if column == $crate::impl_record!(@column $field $(= $column)?) {
                        self.$field = $crate::types::FromRowValue::from_row_value(value)?;
                        return ::std::result::Result::Ok(true);
                    }
                )*
                $($(
                    if <$parent_ty as $crate::record::Record>::assign(&mut self.$parent, column, value)? {
                        return ::std::result::Result::Ok(true);
                    }
                )*)?
                ::std::result::Result::Ok(false)
            }

            fn column_names() -> ::std::vec::Vec<&'static str> {
                #[allow(unused_mut)]
                let mut names = ::std::vec![$($crate::impl_record!(@column $field $(= $column)?)),*];
                $($(
                    names.extend(<$parent_ty as $crate::record::Record>::column_names());
                )*)?
                names
            }
        }
    };
}
