//! Gateway contract ABI definitions
//!
//! Uses alloy's sol! macro to generate type-safe bindings for the token and
//! gateway contracts.

use alloy::sol;

sol! {
    /// Minimal ERC20 interface used for allowance management
    #[sol(rpc)]
    contract ERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);

        event Approval(address indexed owner, address indexed spender, uint256 value);
        event Transfer(address indexed from, address indexed to, uint256 value);
    }

    /// Source-chain escrow ("wallet") contract: custodies deposited tokens
    /// pending cross-chain completion.
    #[sol(rpc)]
    contract GatewayWallet {
        /// Deposit tokens into escrow (requires prior approval)
        function deposit(address token, uint256 amount) external;

        /// Escrowed balance for a user
        function getBalance(address token, address user) external view returns (uint256);

        /// Request a cross-chain transfer of escrowed funds; returns the
        /// protocol-assigned transfer id
        function initiateCrossChainTransfer(address token, uint32 destinationDomain, address destinationRecipient, uint256 amount) external returns (bytes32);

        event Deposited(address indexed token, address indexed depositor, uint256 amount);

        event TransferInitiated(
            bytes32 indexed transferId,
            address indexed token,
            uint32 destinationDomain,
            address destinationRecipient,
            uint256 amount
        );
    }

    /// Destination-chain minter contract: credits tokens once a transfer is
    /// attested.
    #[sol(rpc)]
    contract GatewayMinter {
        /// Complete an attested transfer on the destination chain
        function completeCrossChainTransfer(address token, address recipient, uint256 amount, bytes32 transferId, uint32 sourceDomain) external;

        event TransferCompleted(
            bytes32 indexed transferId,
            address indexed recipient,
            address token,
            uint256 amount,
            uint32 sourceDomain
        );
    }
}
