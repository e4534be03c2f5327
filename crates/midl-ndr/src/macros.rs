//! Declarative helpers for NDR structures and enumerations

/// Resolve an optional field kind to a [`FieldKind`](crate::FieldKind) type.
#[doc(hidden)]
#[macro_export]
macro_rules! __ndr_kind {
    () => {
        $crate::Inline
    };
    ($kind:ident) => {
        $crate::$kind
    };
}

/// Define a structure together with its NDR encoding.
///
/// Fields are marshalled in declaration order. A field may name its
/// [`FieldKind`](crate::FieldKind) with `as Kind`; the default is `Inline`.
/// The structure aligns to its most-aligned field and carries no trailing
/// padding.
///
/// ```
/// midl_ndr::ndr_struct! {
///     /// A host entry.
///     pub struct Host {
///         pub address: u32,
///         pub name: String as Unique,
///     }
/// }
///
/// let host = Host { address: 1, name: "dc01".into() };
/// let bytes = midl_ndr::encode_ndr(&host).unwrap();
/// assert_eq!(midl_ndr::decode_ndr::<Host>(bytes).unwrap(), host);
/// ```
#[macro_export]
macro_rules! ndr_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty $(as $kind:ident)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::NdrEncode for $name {
            fn ndr_align() -> usize {
                let mut align = 1;
                $(
                    align = align.max(
                        <$crate::__ndr_kind!($($kind)?) as $crate::FieldKind<$ty>>::align(),
                    );
                )*
                align
            }

            fn encode_scalars(&self, w: &mut $crate::NdrWriter) -> $crate::Result<()> {
                w.align(<Self as $crate::NdrEncode>::ndr_align());
                $(
                    <$crate::__ndr_kind!($($kind)?) as $crate::FieldKind<$ty>>::encode_scalars(
                        &self.$field,
                        w,
                    )?;
                )*
                Ok(())
            }

            fn encode_deferred(&self, w: &mut $crate::NdrWriter) -> $crate::Result<()> {
                $(
                    <$crate::__ndr_kind!($($kind)?) as $crate::FieldKind<$ty>>::encode_deferred(
                        &self.$field,
                        w,
                    )?;
                )*
                Ok(())
            }
        }

        impl $crate::NdrDecode for $name {
            fn decode_scalars(r: &mut $crate::NdrReader) -> $crate::Result<Self> {
                r.align(<Self as $crate::NdrEncode>::ndr_align())?;
                Ok(Self {
                    $(
                        $field: <$crate::__ndr_kind!($($kind)?) as $crate::FieldKind<$ty>>::decode_scalars(r)?,
                    )*
                })
            }

            fn decode_deferred(&mut self, r: &mut $crate::NdrReader) -> $crate::Result<()> {
                $(
                    <$crate::__ndr_kind!($($kind)?) as $crate::FieldKind<$ty>>::decode_deferred(
                        &mut self.$field,
                        r,
                    )?;
                )*
                Ok(())
            }
        }
    };
}

/// Define a C-style enumeration marshalled as an NDR `enum` (16 bits).
///
/// The first variant is the `Default`. Decoding an unlisted value fails with
/// [`NdrError::InvalidEnumValue`](crate::NdrError::InvalidEnumValue).
#[macro_export]
macro_rules! ndr_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(#[$first_meta:meta])*
            $first:ident = $first_value:literal
            $(
                ,
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal
            )* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u16)]
        $vis enum $name {
            $(#[$first_meta])*
            $first = $first_value,
            $(
                $(#[$vmeta])*
                $variant = $value,
            )*
        }

        impl $name {
            /// Look up the variant carrying a wire value.
            pub fn from_u16(value: u16) -> Option<Self> {
                match value {
                    $first_value => Some(Self::$first),
                    $( $value => Some(Self::$variant), )*
                    _ => None,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$first
            }
        }

        impl From<$name> for u16 {
            fn from(value: $name) -> u16 {
                value as u16
            }
        }

        impl $crate::NdrEncode for $name {
            fn ndr_align() -> usize {
                2
            }

            fn encode_scalars(&self, w: &mut $crate::NdrWriter) -> $crate::Result<()> {
                w.write_enum(*self as u16);
                Ok(())
            }
        }

        impl $crate::NdrDecode for $name {
            fn decode_scalars(r: &mut $crate::NdrReader) -> $crate::Result<Self> {
                let value = r.read_enum()?;
                Self::from_u16(value).ok_or($crate::NdrError::InvalidEnumValue {
                    name: stringify!($name),
                    value,
                })
            }
        }
    };
}

/// Define an RPC parameter list.
///
/// Unlike [`ndr_struct!`], every parameter is marshalled as a complete unit,
/// fixed part and then pointees, before the next parameter starts. That is
/// how top-level `[in]` and `[out]` parameters travel in a request or
/// response stub. Field kinds follow the same `as Kind` syntax.
#[macro_export]
macro_rules! ndr_params {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty $(as $kind:ident)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::NdrEncode for $name {
            fn encode_scalars(&self, w: &mut $crate::NdrWriter) -> $crate::Result<()> {
                $(
                    <$crate::__ndr_kind!($($kind)?) as $crate::FieldKind<$ty>>::encode_scalars(
                        &self.$field,
                        w,
                    )?;
                    <$crate::__ndr_kind!($($kind)?) as $crate::FieldKind<$ty>>::encode_deferred(
                        &self.$field,
                        w,
                    )?;
                )*
                Ok(())
            }
        }

        impl $crate::NdrDecode for $name {
            fn decode_scalars(r: &mut $crate::NdrReader) -> $crate::Result<Self> {
                Ok(Self {
                    $(
                        $field: {
                            let mut value = <$crate::__ndr_kind!($($kind)?) as $crate::FieldKind<$ty>>::decode_scalars(r)?;
                            <$crate::__ndr_kind!($($kind)?) as $crate::FieldKind<$ty>>::decode_deferred(
                                &mut value,
                                r,
                            )?;
                            value
                        },
                    )*
                })
            }
        }
    };
}

/// Define a tagged structure holding a non-encapsulated union.
///
/// The generated enum stands for the IDL pattern
///
/// ```text
/// struct { TAG_ENUM Type; [switch_is(Type)] union { ... } Value; }
/// ```
///
/// Each variant names the arm selected by the tag variant of the same name.
/// On the wire the tag is written as an `enum`, followed by the union's own
/// copy of the discriminant and the arm, both aligned to the union.
///
/// ```
/// midl_ndr::ndr_enum! {
///     pub enum Kind { Number = 0, Text = 1 }
/// }
///
/// midl_ndr::ndr_union! {
///     pub enum Value: Kind {
///         Number(u32),
///         Text(String as Unique),
///     }
/// }
///
/// let value = Value::Text("hi".into());
/// assert_eq!(value.tag(), Kind::Text);
/// let bytes = midl_ndr::encode_ndr(&value).unwrap();
/// assert_eq!(midl_ndr::decode_ndr::<Value>(bytes).unwrap(), value);
/// ```
///
/// When the IDL computes the switch from the tag (`switch_is(F(tag))`), name a
/// `fn(u16) -> u16` with `switch_is(..)` after the tag type. Several tags may
/// then share one arm on the wire while each keeps its own variant.
#[macro_export]
macro_rules! ndr_union {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $tag:ident { $($body:tt)* }
    ) => {
        $crate::ndr_union! {
            $(#[$meta])*
            $vis enum $name : $tag switch_is(::core::convert::identity) { $($body)* }
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $tag:ident switch_is($switch:expr) {
            $(#[$first_meta:meta])*
            $first:ident ( $first_ty:ty $(as $first_kind:ident)? )
            $(
                ,
                $(#[$vmeta:meta])*
                $variant:ident ( $vty:ty $(as $vkind:ident)? )
            )* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis enum $name {
            $(#[$first_meta])*
            $first($first_ty),
            $(
                $(#[$vmeta])*
                $variant($vty),
            )*
        }

        impl $name {
            /// Discriminant selecting the active arm.
            pub fn tag(&self) -> $tag {
                match self {
                    Self::$first(_) => $tag::$first,
                    $( Self::$variant(_) => $tag::$variant, )*
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$first(<$first_ty as Default>::default())
            }
        }

        impl $crate::NdrEncode for $name {
            fn ndr_align() -> usize {
                let mut align = 2;
                align = align.max(
                    <$crate::__ndr_kind!($($first_kind)?) as $crate::FieldKind<$first_ty>>::align(),
                );
                $(
                    align = align.max(
                        <$crate::__ndr_kind!($($vkind)?) as $crate::FieldKind<$vty>>::align(),
                    );
                )*
                align
            }

            fn encode_scalars(&self, w: &mut $crate::NdrWriter) -> $crate::Result<()> {
                let align = <Self as $crate::NdrEncode>::ndr_align();
                let tag = u16::from(self.tag());
                w.align(align);
                let switch: u16 = ($switch)(tag);
                w.write_enum(tag);
                w.write_union_switch(switch, align);
                match self {
                    Self::$first(arm) => {
                        <$crate::__ndr_kind!($($first_kind)?) as $crate::FieldKind<$first_ty>>::encode_scalars(arm, w)
                    }
                    $(
                        Self::$variant(arm) => {
                            <$crate::__ndr_kind!($($vkind)?) as $crate::FieldKind<$vty>>::encode_scalars(arm, w)
                        }
                    )*
                }
            }

            fn encode_deferred(&self, w: &mut $crate::NdrWriter) -> $crate::Result<()> {
                match self {
                    Self::$first(arm) => {
                        <$crate::__ndr_kind!($($first_kind)?) as $crate::FieldKind<$first_ty>>::encode_deferred(arm, w)
                    }
                    $(
                        Self::$variant(arm) => {
                            <$crate::__ndr_kind!($($vkind)?) as $crate::FieldKind<$vty>>::encode_deferred(arm, w)
                        }
                    )*
                }
            }
        }

        impl $crate::NdrDecode for $name {
            fn decode_scalars(r: &mut $crate::NdrReader) -> $crate::Result<Self> {
                let align = <Self as $crate::NdrEncode>::ndr_align();
                r.align(align)?;
                let value = r.read_enum()?;
                let switch = r.read_union_switch(align)?;
                let expected: u16 = ($switch)(value);
                if switch != expected {
                    return Err($crate::NdrError::InvalidDiscriminant {
                        union: stringify!($name),
                        value: switch,
                    });
                }
                match $tag::from_u16(value) {
                    Some($tag::$first) => Ok(Self::$first(
                        <$crate::__ndr_kind!($($first_kind)?) as $crate::FieldKind<$first_ty>>::decode_scalars(r)?,
                    )),
                    $(
                        Some($tag::$variant) => Ok(Self::$variant(
                            <$crate::__ndr_kind!($($vkind)?) as $crate::FieldKind<$vty>>::decode_scalars(r)?,
                        )),
                    )*
                    _ => Err($crate::NdrError::InvalidDiscriminant {
                        union: stringify!($name),
                        value,
                    }),
                }
            }

            fn decode_deferred(&mut self, r: &mut $crate::NdrReader) -> $crate::Result<()> {
                match self {
                    Self::$first(arm) => {
                        <$crate::__ndr_kind!($($first_kind)?) as $crate::FieldKind<$first_ty>>::decode_deferred(arm, r)
                    }
                    $(
                        Self::$variant(arm) => {
                            <$crate::__ndr_kind!($($vkind)?) as $crate::FieldKind<$vty>>::decode_deferred(arm, r)
                        }
                    )*
                }
            }
        }
    };
}
