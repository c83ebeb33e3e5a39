//! Solidity call bindings
//!
//! Only the calls the router composes are bound here. Each amount that a
//! relaying contract overwrites at execution time has a matching `*_OFFSET`
//! constant: the byte offset of its 32-byte word inside the encoded call.

use alloy_sol_types::sol;
use omni_core::calldata::{param_offset, struct_field_offset};

sol! {
    interface IMetaRouter {
        struct MetaRouteTransaction {
            bytes firstSwapCalldata;
            bytes secondSwapCalldata;
            address[] approvedTokens;
            address firstDexRouter;
            address secondDexRouter;
            uint256 amount;
            bool nativeIn;
            address relayRecipient;
            bytes otherSideCalldata;
        }

        function metaRoute(MetaRouteTransaction txn) external payable;
    }
}

sol! {
    interface IPortal {
        struct MetaSynthesizeTransaction {
            uint256 stableBridgingFee;
            uint256 amount;
            address rtoken;
            address chain2address;
            address receiveSide;
            address oppositeBridge;
            address syntCaller;
            uint256 chainID;
            address[] swapTokens;
            address secondDexRouter;
            bytes secondSwapCalldata;
            address finalReceiveSide;
            bytes finalCalldata;
            uint256 finalOffset;
            address revertableAddress;
            bytes32 clientID;
        }

        function metaSynthesize(MetaSynthesizeTransaction txn) external returns (bytes32);

        function metaUnsynthesize(
            uint256 stableBridgingFee,
            bytes32 crossChainID,
            bytes32 externalID,
            address to,
            uint256 amount,
            address rToken,
            address finalReceiveSide,
            bytes finalCalldata,
            uint256 finalOffset
        ) external;
    }
}

sol! {
    interface ISynthesis {
        struct MetaMintTransaction {
            uint256 stableBridgingFee;
            uint256 amount;
            bytes32 crossChainID;
            bytes32 externalID;
            address tokenReal;
            uint256 chainID;
            address to;
            address[] swapTokens;
            address secondDexRouter;
            bytes secondSwapCalldata;
            address finalReceiveSide;
            bytes finalCalldata;
            uint256 finalOffset;
        }

        struct MetaBurnTransaction {
            uint256 stableBridgingFee;
            uint256 amount;
            address syntCaller;
            address finalReceiveSide;
            address sToken;
            bytes finalCallData;
            uint256 finalOffset;
            address chain2address;
            address receiveSide;
            address oppositeBridge;
            address revertableAddress;
            uint256 chainID;
            bytes32 clientID;
        }

        function metaMintSyntheticToken(MetaMintTransaction txn) external;

        function metaBurnSyntheticToken(MetaBurnTransaction txn) external returns (bytes32);
    }
}

sol! {
    interface IOctoPool {
        function swap(
            uint256 indexIn,
            uint256 indexOut,
            uint256 amount,
            uint256 minAmountOut,
            address to,
            uint256 deadline
        ) external returns (uint256);

        function quote(uint256 indexIn, uint256 indexOut, uint256 amount) external view returns (uint256);
    }
}

sol! {
    interface IMulticallRouter {
        function multicall(
            uint256 amountIn,
            bytes[] calldatas,
            address[] receiveSides,
            address[] path,
            uint256[] offsets,
            address to
        ) external;
    }
}

sol! {
    interface IFeeCollector {
        function collectFee(address token, uint256 amount) external;
    }
}

sol! {
    interface IWETH {
        function deposit() external payable;

        function withdraw(uint256 wad) external;
    }
}

/// `amount` of `metaRoute`
pub const META_ROUTE_AMOUNT_OFFSET: usize = struct_field_offset(5);

/// `amount` of `metaSynthesize`
pub const META_SYNTHESIZE_AMOUNT_OFFSET: usize = struct_field_offset(1);

/// `amount` of `metaUnsynthesize`
pub const META_UNSYNTHESIZE_AMOUNT_OFFSET: usize = param_offset(4);

/// `amount` of `metaMintSyntheticToken`
pub const META_MINT_AMOUNT_OFFSET: usize = struct_field_offset(1);

/// `amount` of `metaBurnSyntheticToken`
pub const META_BURN_AMOUNT_OFFSET: usize = struct_field_offset(1);

/// `amount` of the omnipool `swap`
pub const OCTOPOOL_SWAP_AMOUNT_OFFSET: usize = param_offset(2);

/// `minAmountOut` of the omnipool `swap`
pub const OCTOPOOL_SWAP_MIN_OUT_OFFSET: usize = param_offset(3);

/// `amountIn` of `multicall`
pub const MULTICALL_AMOUNT_OFFSET: usize = param_offset(0);

/// `amount` of `collectFee`
pub const COLLECT_FEE_AMOUNT_OFFSET: usize = param_offset(1);

/// `wad` of the wrapped-native `withdraw`
pub const WETH_WITHDRAW_AMOUNT_OFFSET: usize = param_offset(0);
