//! The dhcpsrv v1 operation table.
//!
//! Every RPC of the interface is listed once, in opnum order, with its
//! request (`[in]` and `[in, out]`) and response (`[in, out]` and `[out]`)
//! parameters in IDL order. Request, response, client and server code is
//! generated from it: `dhcpsrv_v1_operations!(callback)` hands the whole
//! table to `callback!`. Responses gain a trailing `return_value: u32`.
//!
//! ```text
//! OPNUM => Marker(Request, Response) fn method = "WireName" {
//!     request { name: Type [as Kind], ... }
//!     response { name: Type [as Kind], ... }
//! }
//! ```

macro_rules! dhcpsrv_v1_operations {
    ($callback:ident) => {
        $callback! {
            /// Create an IPv4 subnet.
            0 => CreateSubnet(CreateSubnetRequest, CreateSubnetResponse) fn create_subnet = "R_DhcpCreateSubnet" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                    subnet_info: Option<SubnetInfo> as Ref,
                }
                response {}
            }
            /// Replace the information of an existing subnet.
            1 => SetSubnetInfo(SetSubnetInfoRequest, SetSubnetInfoResponse) fn set_subnet_info = "R_DhcpSetSubnetInfo" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                    subnet_info: Option<SubnetInfo> as Ref,
                }
                response {}
            }
            /// Retrieve the information of a subnet.
            2 => GetSubnetInfo(GetSubnetInfoRequest, GetSubnetInfoResponse) fn get_subnet_info = "R_DhcpGetSubnetInfo" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                }
                response {
                    subnet_info: Option<SubnetInfo> as Unique,
                }
            }
            /// Enumerate the subnets defined on the server.
            3 => EnumSubnets(EnumSubnetsRequest, EnumSubnetsResponse) fn enum_subnets = "R_DhcpEnumSubnets" {
                request {
                    server_ip_address: String as Unique,
                    resume: ResumeHandle,
                    preferred_maximum: u32,
                }
                response {
                    resume: ResumeHandle,
                    enum_info: Option<IpArray> as Unique,
                    elements_read: u32,
                    elements_total: u32,
                }
            }
            /// Add a range, exclusion, reservation or host to a subnet.
            4 => AddSubnetElement(AddSubnetElementRequest, AddSubnetElementResponse) fn add_subnet_element = "R_DhcpAddSubnetElement" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                    add_element_info: Option<SubnetElementData> as Ref,
                }
                response {}
            }
            /// Enumerate the elements of one type in a subnet.
            5 => EnumSubnetElements(EnumSubnetElementsRequest, EnumSubnetElementsResponse) fn enum_subnet_elements = "R_DhcpEnumSubnetElements" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                    enum_element_type: SubnetElementType,
                    resume: ResumeHandle,
                    preferred_maximum: u32,
                }
                response {
                    resume: ResumeHandle,
                    enum_element_info: Option<SubnetElementInfoArray> as Unique,
                    elements_read: u32,
                    elements_total: u32,
                }
            }
            /// Remove an element from a subnet.
            6 => RemoveSubnetElement(RemoveSubnetElementRequest, RemoveSubnetElementResponse) fn remove_subnet_element = "R_DhcpRemoveSubnetElement" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                    remove_element_info: Option<SubnetElementData> as Ref,
                    force_flag: ForceFlag,
                }
                response {}
            }
            /// Delete a subnet.
            7 => DeleteSubnet(DeleteSubnetRequest, DeleteSubnetResponse) fn delete_subnet = "R_DhcpDeleteSubnet" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                    force_flag: ForceFlag,
                }
                response {}
            }
            /// Define a new option.
            8 => CreateOption(CreateOptionRequest, CreateOptionResponse) fn create_option = "R_DhcpCreateOption" {
                request {
                    server_ip_address: String as Unique,
                    option_id: DhcpOptionId,
                    option_info: Option<DhcpOption> as Ref,
                }
                response {}
            }
            /// Modify an option definition.
            9 => SetOptionInfo(SetOptionInfoRequest, SetOptionInfoResponse) fn set_option_info = "R_DhcpSetOptionInfo" {
                request {
                    server_ip_address: String as Unique,
                    option_id: DhcpOptionId,
                    option_info: Option<DhcpOption> as Ref,
                }
                response {}
            }
            /// Retrieve an option definition.
            10 => GetOptionInfo(GetOptionInfoRequest, GetOptionInfoResponse) fn get_option_info = "R_DhcpGetOptionInfo" {
                request {
                    server_ip_address: String as Unique,
                    option_id: DhcpOptionId,
                }
                response {
                    option_info: Option<DhcpOption> as Unique,
                }
            }
            /// Delete an option definition.
            11 => RemoveOption(RemoveOptionRequest, RemoveOptionResponse) fn remove_option = "R_DhcpRemoveOption" {
                request {
                    server_ip_address: String as Unique,
                    option_id: DhcpOptionId,
                }
                response {}
            }
            /// Set an option value at a scope.
            12 => SetOptionValue(SetOptionValueRequest, SetOptionValueResponse) fn set_option_value = "R_DhcpSetOptionValue" {
                request {
                    server_ip_address: String as Unique,
                    option_id: DhcpOptionId,
                    scope_info: Option<OptionScopeInfo> as Ref,
                    option_value: Option<OptionData> as Ref,
                }
                response {}
            }
            /// Retrieve an option value at a scope.
            13 => GetOptionValue(GetOptionValueRequest, GetOptionValueResponse) fn get_option_value = "R_DhcpGetOptionValue" {
                request {
                    server_ip_address: String as Unique,
                    option_id: DhcpOptionId,
                    scope_info: Option<OptionScopeInfo> as Ref,
                }
                response {
                    option_value: Option<OptionValue> as Unique,
                }
            }
            /// Enumerate the option values set at a scope.
            14 => EnumOptionValues(EnumOptionValuesRequest, EnumOptionValuesResponse) fn enum_option_values = "R_DhcpEnumOptionValues" {
                request {
                    server_ip_address: String as Unique,
                    scope_info: Option<OptionScopeInfo> as Ref,
                    resume: ResumeHandle,
                    preferred_maximum: u32,
                }
                response {
                    resume: ResumeHandle,
                    option_values: Option<OptionValueArray> as Unique,
                    options_read: u32,
                    options_total: u32,
                }
            }
            /// Remove an option value from a scope.
            15 => RemoveOptionValue(RemoveOptionValueRequest, RemoveOptionValueResponse) fn remove_option_value = "R_DhcpRemoveOptionValue" {
                request {
                    server_ip_address: String as Unique,
                    option_id: DhcpOptionId,
                    scope_info: Option<OptionScopeInfo> as Ref,
                }
                response {}
            }
            /// Create a client lease record.
            16 => CreateClientInfo(CreateClientInfoRequest, CreateClientInfoResponse) fn create_client_info = "R_DhcpCreateClientInfo" {
                request {
                    server_ip_address: String as Unique,
                    client_info: Option<ClientInfo> as Ref,
                }
                response {}
            }
            /// Modify a client lease record.
            17 => SetClientInfo(SetClientInfoRequest, SetClientInfoResponse) fn set_client_info = "R_DhcpSetClientInfo" {
                request {
                    server_ip_address: String as Unique,
                    client_info: Option<ClientInfo> as Ref,
                }
                response {}
            }
            /// Look up a client lease record.
            18 => GetClientInfo(GetClientInfoRequest, GetClientInfoResponse) fn get_client_info = "R_DhcpGetClientInfo" {
                request {
                    server_ip_address: String as Unique,
                    search_info: Option<SearchInfo> as Ref,
                }
                response {
                    client_info: Option<ClientInfo> as Unique,
                }
            }
            /// Delete a client lease record.
            19 => DeleteClientInfo(DeleteClientInfoRequest, DeleteClientInfoResponse) fn delete_client_info = "R_DhcpDeleteClientInfo" {
                request {
                    server_ip_address: String as Unique,
                    client_info: Option<SearchInfo> as Ref,
                }
                response {}
            }
            /// Enumerate the leases of a subnet.
            20 => EnumSubnetClients(EnumSubnetClientsRequest, EnumSubnetClientsResponse) fn enum_subnet_clients = "R_DhcpEnumSubnetClients" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                    resume: ResumeHandle,
                    preferred_maximum: u32,
                }
                response {
                    resume: ResumeHandle,
                    client_info: Option<ClientInfoArray> as Unique,
                    clients_read: u32,
                    clients_total: u32,
                }
            }
            /// Retrieve the options delivered to a client.
            21 => GetClientOptions(GetClientOptionsRequest, GetClientOptionsResponse) fn get_client_options = "R_DhcpGetClientOptions" {
                request {
                    server_ip_address: String as Unique,
                    client_ip_address: DhcpIpAddress,
                    client_subnet_mask: DhcpIpMask,
                }
                response {
                    client_options: Option<OptionList> as Unique,
                }
            }
            /// Retrieve server statistics.
            22 => GetMibInfo(GetMibInfoRequest, GetMibInfoResponse) fn get_mib_info = "R_DhcpGetMibInfo" {
                request {
                    server_ip_address: String as Unique,
                }
                response {
                    mib_info: Option<MibInfo> as Unique,
                }
            }
            /// Enumerate the option definitions.
            23 => EnumOptions(EnumOptionsRequest, EnumOptionsResponse) fn enum_options = "R_DhcpEnumOptions" {
                request {
                    server_ip_address: String as Unique,
                    resume: ResumeHandle,
                    preferred_maximum: u32,
                }
                response {
                    resume: ResumeHandle,
                    options: Option<OptionArray> as Unique,
                    options_read: u32,
                    options_total: u32,
                }
            }
            /// Set several option values at a scope.
            24 => SetOptionValues(SetOptionValuesRequest, SetOptionValuesResponse) fn set_option_values = "R_DhcpSetOptionValues" {
                request {
                    server_ip_address: String as Unique,
                    scope_info: Option<OptionScopeInfo> as Ref,
                    option_values: Option<OptionValueArray> as Ref,
                }
                response {}
            }
            /// Update the server configuration fields selected by `fields_to_set`.
            25 => ServerSetConfig(ServerSetConfigRequest, ServerSetConfigResponse) fn server_set_config = "R_DhcpServerSetConfig" {
                request {
                    server_ip_address: String as Unique,
                    fields_to_set: u32,
                    config_info: Option<ServerConfigInfo> as Ref,
                }
                response {}
            }
            /// Retrieve the server configuration.
            26 => ServerGetConfig(ServerGetConfigRequest, ServerGetConfigResponse) fn server_get_config = "R_DhcpServerGetConfig" {
                request {
                    server_ip_address: String as Unique,
                }
                response {
                    config_info: Option<ServerConfigInfo> as Unique,
                }
            }
            /// Check a subnet's leases against the registry, optionally fixing them.
            27 => ScanDatabase(ScanDatabaseRequest, ScanDatabaseResponse) fn scan_database = "R_DhcpScanDatabase" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                    fix_flag: u32,
                }
                response {
                    scan_list: Option<ScanList> as Unique,
                }
            }
            /// Retrieve the server's major and minor version.
            28 => GetVersion(GetVersionRequest, GetVersionResponse) fn get_version = "R_DhcpGetVersion" {
                request {
                    server_ip_address: String as Unique,
                }
                response {
                    major_version: u32,
                    minor_version: u32,
                }
            }
            /// Add an element to a subnet, with typed reservations.
            29 => AddSubnetElementV4(AddSubnetElementV4Request, AddSubnetElementV4Response) fn add_subnet_element_v4 = "R_DhcpAddSubnetElementV4" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                    add_element_info: Option<SubnetElementDataV4> as Ref,
                }
                response {}
            }
            /// Enumerate the elements of one type in a subnet, with typed reservations.
            30 => EnumSubnetElementsV4(EnumSubnetElementsV4Request, EnumSubnetElementsV4Response) fn enum_subnet_elements_v4 = "R_DhcpEnumSubnetElementsV4" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                    enum_element_type: SubnetElementType,
                    resume: ResumeHandle,
                    preferred_maximum: u32,
                }
                response {
                    resume: ResumeHandle,
                    enum_element_info: Option<SubnetElementInfoArrayV4> as Unique,
                    elements_read: u32,
                    elements_total: u32,
                }
            }
            /// Remove an element from a subnet, with typed reservations.
            31 => RemoveSubnetElementV4(RemoveSubnetElementV4Request, RemoveSubnetElementV4Response) fn remove_subnet_element_v4 = "R_DhcpRemoveSubnetElementV4" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                    remove_element_info: Option<SubnetElementDataV4> as Ref,
                    force_flag: ForceFlag,
                }
                response {}
            }
            /// Create a client lease record with its client type.
            32 => CreateClientInfoV4(CreateClientInfoV4Request, CreateClientInfoV4Response) fn create_client_info_v4 = "R_DhcpCreateClientInfoV4" {
                request {
                    server_ip_address: String as Unique,
                    client_info: Option<ClientInfoV4> as Ref,
                }
                response {}
            }
            /// Modify a client lease record with its client type.
            33 => SetClientInfoV4(SetClientInfoV4Request, SetClientInfoV4Response) fn set_client_info_v4 = "R_DhcpSetClientInfoV4" {
                request {
                    server_ip_address: String as Unique,
                    client_info: Option<ClientInfoV4> as Ref,
                }
                response {}
            }
            /// Look up a client lease record with its client type.
            34 => GetClientInfoV4(GetClientInfoV4Request, GetClientInfoV4Response) fn get_client_info_v4 = "R_DhcpGetClientInfoV4" {
                request {
                    server_ip_address: String as Unique,
                    search_info: Option<SearchInfo> as Ref,
                }
                response {
                    client_info: Option<ClientInfoV4> as Unique,
                }
            }
            /// Enumerate the leases of a subnet with their client types.
            35 => EnumSubnetClientsV4(EnumSubnetClientsV4Request, EnumSubnetClientsV4Response) fn enum_subnet_clients_v4 = "R_DhcpEnumSubnetClientsV4" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                    resume: ResumeHandle,
                    preferred_maximum: u32,
                }
                response {
                    resume: ResumeHandle,
                    client_info: Option<ClientInfoArrayV4> as Unique,
                    clients_read: u32,
                    clients_total: u32,
                }
            }
            /// Add a subnet to a superscope, or remove it when the name is empty.
            36 => SetSuperScopeV4(SetSuperScopeV4Request, SetSuperScopeV4Response) fn set_super_scope_v4 = "R_DhcpSetSuperScopeV4" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                    super_scope_name: String as Unique,
                    change_existing: bool as Bool32,
                }
                response {}
            }
            /// Retrieve the superscope membership of every subnet.
            37 => GetSuperScopeInfoV4(GetSuperScopeInfoV4Request, GetSuperScopeInfoV4Response) fn get_super_scope_info_v4 = "R_DhcpGetSuperScopeInfoV4" {
                request {
                    server_ip_address: String as Unique,
                }
                response {
                    super_scope_table: Option<SuperScopeTable> as Unique,
                }
            }
            /// Delete a superscope.
            38 => DeleteSuperScopeV4(DeleteSuperScopeV4Request, DeleteSuperScopeV4Response) fn delete_super_scope_v4 = "R_DhcpDeleteSuperScopeV4" {
                request {
                    server_ip_address: String as Unique,
                    super_scope_name: String as Ref,
                }
                response {}
            }
            39 => ServerSetConfigV4(ServerSetConfigV4Request, ServerSetConfigV4Response) fn server_set_config_v4 = "R_DhcpServerSetConfigV4" {
                request {
                    server_ip_address: String as Unique,
                    fields_to_set: u32,
                    config_info: Option<ServerConfigInfoV4> as Ref,
                }
                response {}
            }
            40 => ServerGetConfigV4(ServerGetConfigV4Request, ServerGetConfigV4Response) fn server_get_config_v4 = "R_DhcpServerGetConfigV4" {
                request {
                    server_ip_address: String as Unique,
                }
                response {
                    config_info: Option<ServerConfigInfoV4> as Unique,
                }
            }
            /// Update the server configuration, including NAP settings.
            41 => ServerSetConfigVq(ServerSetConfigVqRequest, ServerSetConfigVqResponse) fn server_set_config_vq = "R_DhcpServerSetConfigVQ" {
                request {
                    server_ip_address: String as Unique,
                    fields_to_set: u32,
                    config_info: Option<ServerConfigInfoVq> as Ref,
                }
                response {}
            }
            /// Retrieve the server configuration, including NAP settings.
            42 => ServerGetConfigVq(ServerGetConfigVqRequest, ServerGetConfigVqResponse) fn server_get_config_vq = "R_DhcpServerGetConfigVQ" {
                request {
                    server_ip_address: String as Unique,
                }
                response {
                    config_info: Option<ServerConfigInfoVq> as Unique,
                }
            }
            /// Retrieve server statistics, including quarantine counters.
            43 => GetMibInfoVq(GetMibInfoVqRequest, GetMibInfoVqResponse) fn get_mib_info_vq = "R_DhcpGetMibInfoVQ" {
                request {
                    server_ip_address: String as Unique,
                }
                response {
                    mib_info: Option<MibInfoVq> as Unique,
                }
            }
            44 => CreateClientInfoVq(CreateClientInfoVqRequest, CreateClientInfoVqResponse) fn create_client_info_vq = "R_DhcpCreateClientInfoVQ" {
                request {
                    server_ip_address: String as Unique,
                    client_info: Option<ClientInfoVq> as Ref,
                }
                response {}
            }
            45 => SetClientInfoVq(SetClientInfoVqRequest, SetClientInfoVqResponse) fn set_client_info_vq = "R_DhcpSetClientInfoVQ" {
                request {
                    server_ip_address: String as Unique,
                    client_info: Option<ClientInfoVq> as Ref,
                }
                response {}
            }
            /// Look up a client lease record with its quarantine state.
            46 => GetClientInfoVq(GetClientInfoVqRequest, GetClientInfoVqResponse) fn get_client_info_vq = "R_DhcpGetClientInfoVQ" {
                request {
                    server_ip_address: String as Unique,
                    search_info: Option<SearchInfo> as Ref,
                }
                response {
                    client_info: Option<ClientInfoVq> as Unique,
                }
            }
            /// Enumerate the leases of a subnet with their quarantine state.
            47 => EnumSubnetClientsVq(EnumSubnetClientsVqRequest, EnumSubnetClientsVqResponse) fn enum_subnet_clients_vq = "R_DhcpEnumSubnetClientsVQ" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                    resume: ResumeHandle,
                    preferred_maximum: u32,
                }
                response {
                    resume: ResumeHandle,
                    client_info: Option<ClientInfoArrayVq> as Unique,
                    clients_read: u32,
                    clients_total: u32,
                }
            }
            /// Create an IPv4 subnet with its NAP setting.
            48 => CreateSubnetVq(CreateSubnetVqRequest, CreateSubnetVqResponse) fn create_subnet_vq = "R_DhcpCreateSubnetVQ" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                    subnet_info: Option<SubnetInfoVq> as Ref,
                }
                response {}
            }
            49 => GetSubnetInfoVq(GetSubnetInfoVqRequest, GetSubnetInfoVqResponse) fn get_subnet_info_vq = "R_DhcpGetSubnetInfoVQ" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                }
                response {
                    subnet_info: Option<SubnetInfoVq> as Unique,
                }
            }
            50 => SetSubnetInfoVq(SetSubnetInfoVqRequest, SetSubnetInfoVqResponse) fn set_subnet_info_vq = "R_DhcpSetSubnetInfoVQ" {
                request {
                    server_ip_address: String as Unique,
                    subnet_address: DhcpIpAddress,
                    subnet_info: Option<SubnetInfoVq> as Ref,
                }
                response {}
            }
        }
    };
}

pub(crate) use dhcpsrv_v1_operations;
