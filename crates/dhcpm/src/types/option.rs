//! Option definitions, option values and the scopes they apply to.

use super::{BinaryData, DhcpIpAddress, DhcpOptionId};
use midl_ndr::{
    FieldKind, NdrDecode, NdrEncode, NdrError, NdrReader, NdrWriter, Result as NdrResult, Unique,
};

midl_ndr::ndr_enum! {
    /// `DHCP_OPTION_DATA_TYPE`
    pub enum OptionDataType {
        Byte = 0,
        Word = 1,
        DWord = 2,
        DWordDWord = 3,
        IpAddress = 4,
        String = 5,
        Binary = 6,
        Encapsulated = 7,
        Ipv6Address = 8,
    }
}

midl_ndr::ndr_enum! {
    /// `DHCP_OPTION_TYPE`: whether an option holds one element or an array.
    pub enum OptionType {
        UnaryElement = 0,
        Array = 1,
    }
}

midl_ndr::ndr_enum! {
    /// `DHCP_OPTION_SCOPE_TYPE`
    pub enum OptionScopeType {
        Default = 0,
        Global = 1,
        Subnet = 2,
        Reserved = 3,
        MScope = 4,
    }
}

midl_ndr::ndr_struct! {
    pub struct DwordDword {
        pub dword1: u32,
        pub dword2: u32,
    }
}

midl_ndr::ndr_union! {
    /// A single option value element, typed by [`OptionDataType`].
    pub enum OptionDataElement: OptionDataType {
        Byte(u8),
        Word(u16),
        DWord(u32),
        DWordDWord(DwordDword),
        IpAddress(DhcpIpAddress),
        String(String as Unique),
        Binary(BinaryData),
        Encapsulated(BinaryData),
        Ipv6Address(String as Unique),
    }
}

midl_ndr::ndr_struct! {
    pub struct OptionData {
        pub elements: Vec<OptionDataElement> as Counted,
    }
}

impl From<Vec<OptionDataElement>> for OptionData {
    fn from(elements: Vec<OptionDataElement>) -> Self {
        Self { elements }
    }
}

impl From<OptionDataElement> for OptionData {
    fn from(element: OptionDataElement) -> Self {
        Self {
            elements: vec![element],
        }
    }
}

midl_ndr::ndr_struct! {
    /// An option definition.
    pub struct DhcpOption {
        pub option_id: DhcpOptionId,
        pub option_name: String as Unique,
        pub option_comment: String as Unique,
        pub default_value: OptionData,
        pub option_type: OptionType,
    }
}

midl_ndr::ndr_struct! {
    pub struct OptionArray {
        pub options: Vec<DhcpOption> as Counted,
    }
}

midl_ndr::ndr_struct! {
    pub struct OptionValue {
        pub option_id: DhcpOptionId,
        pub value: OptionData,
    }
}

impl OptionValue {
    pub fn new(option_id: DhcpOptionId, value: impl Into<OptionData>) -> Self {
        Self {
            option_id,
            value: value.into(),
        }
    }
}

midl_ndr::ndr_struct! {
    pub struct OptionValueArray {
        pub values: Vec<OptionValue> as Counted,
    }
}

midl_ndr::ndr_struct! {
    /// Options delivered to one client.
    pub struct OptionList {
        pub options: Vec<OptionValue> as Counted,
    }
}

midl_ndr::ndr_struct! {
    /// The reservation an option value is scoped to.
    pub struct ReservedScope {
        pub reserved_ip_address: DhcpIpAddress,
        pub reserved_ip_subnet_address: DhcpIpAddress,
    }
}

/// Where an option value applies (`DHCP_OPTION_SCOPE_INFO`).
///
/// The default and global scopes carry no data.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OptionScopeInfo {
    #[default]
    Default,
    Global,
    Subnet(DhcpIpAddress),
    Reserved(ReservedScope),
    MScope(String),
}

impl OptionScopeInfo {
    pub fn scope_type(&self) -> OptionScopeType {
        match self {
            Self::Default => OptionScopeType::Default,
            Self::Global => OptionScopeType::Global,
            Self::Subnet(_) => OptionScopeType::Subnet,
            Self::Reserved(_) => OptionScopeType::Reserved,
            Self::MScope(_) => OptionScopeType::MScope,
        }
    }
}

impl NdrEncode for OptionScopeInfo {
    fn ndr_align() -> usize {
        4
    }

    fn encode_scalars(&self, w: &mut NdrWriter) -> NdrResult<()> {
        let tag = u16::from(self.scope_type());
        w.align(4);
        w.write_enum(tag);
        w.write_union_switch(tag, 4);
        match self {
            Self::Default | Self::Global => Ok(()),
            Self::Subnet(address) => {
                w.write_u32(*address);
                Ok(())
            }
            Self::Reserved(scope) => scope.encode_scalars(w),
            Self::MScope(name) => <Unique as FieldKind<String>>::encode_scalars(name, w),
        }
    }

    fn encode_deferred(&self, w: &mut NdrWriter) -> NdrResult<()> {
        match self {
            Self::MScope(name) => <Unique as FieldKind<String>>::encode_deferred(name, w),
            _ => Ok(()),
        }
    }
}

impl NdrDecode for OptionScopeInfo {
    fn decode_scalars(r: &mut NdrReader) -> NdrResult<Self> {
        r.align(4)?;
        let value = r.read_enum()?;
        let switch = r.read_union_switch(4)?;
        if switch != value {
            return Err(NdrError::InvalidDiscriminant {
                union: "OptionScopeInfo",
                value: switch,
            });
        }
        match OptionScopeType::from_u16(value) {
            Some(OptionScopeType::Default) => Ok(Self::Default),
            Some(OptionScopeType::Global) => Ok(Self::Global),
            Some(OptionScopeType::Subnet) => Ok(Self::Subnet(r.read_u32()?)),
            Some(OptionScopeType::Reserved) => Ok(Self::Reserved(ReservedScope::decode_scalars(r)?)),
            Some(OptionScopeType::MScope) => Ok(Self::MScope(
                <Unique as FieldKind<String>>::decode_scalars(r)?,
            )),
            None => Err(NdrError::InvalidDiscriminant {
                union: "OptionScopeInfo",
                value,
            }),
        }
    }

    fn decode_deferred(&mut self, r: &mut NdrReader) -> NdrResult<()> {
        match self {
            Self::MScope(name) => <Unique as FieldKind<String>>::decode_deferred(name, r),
            _ => Ok(()),
        }
    }
}
