//! Definitions of the Solidity interfaces the scripts call

use alloy::sol;

sol! {
    /// The LSP0 ERC725Account, combining ERC725X execution and ERC725Y storage
    #[sol(rpc)]
    interface ILSP0 {
        event ContractCreated(uint256 indexed operationType, address indexed contractAddress, uint256 value, bytes32 indexed salt);

        function execute(uint256 operationType, address target, uint256 value, bytes memory data) external payable returns (bytes memory);
        function getData(bytes32 dataKey) external view returns (bytes memory dataValue);
        function setDataBatch(bytes32[] memory dataKeys, bytes[] memory dataValues) external payable;
    }
}

sol! {
    /// An LSP7 digital asset
    interface ILSP7 {
        function authorizeOperator(address operator, uint256 amount, bytes memory operatorNotificationData) external;
    }
}
