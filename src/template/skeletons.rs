//! Fixed Solidity skeletons, one per structural variant.
//!
//! Every skeleton shares the same prelude (license line, pragma, the reactive
//! interfaces and `AbstractReactive`), so the generated file compiles on its
//! own with no imports. Placeholder lines are `{{NAME}}`; fragments supplied
//! for them carry their own indentation.

macro_rules! prelude {
    () => {
        r#"// SPDX-License-Identifier: GPL-2.0-or-later
pragma solidity {{PRAGMA}};

interface IPayer {
    function pay(uint256 amount) external;
}

interface ISubscriptionService {
    function subscribe(
        uint256 chain_id,
        address _contract,
        uint256 topic_0,
        uint256 topic_1,
        uint256 topic_2,
        uint256 topic_3
    ) external;

    function unsubscribe(
        uint256 chain_id,
        address _contract,
        uint256 topic_0,
        uint256 topic_1,
        uint256 topic_2,
        uint256 topic_3
    ) external;
}

interface IReactive is IPayer {
    struct LogRecord {
        uint256 chain_id;
        address _contract;
        uint256 topic_0;
        uint256 topic_1;
        uint256 topic_2;
        uint256 topic_3;
        bytes data;
        uint256 block_number;
        uint256 op_code;
        uint256 block_hash;
        uint256 tx_hash;
        uint256 log_index;
    }

    event Callback(
        uint256 indexed chain_id,
        address indexed _contract,
        uint64 indexed gas_limit,
        bytes payload
    );

    function react(LogRecord calldata log) external;
}

abstract contract AbstractReactive is IReactive {
    uint256 internal constant REACTIVE_IGNORE =
        0xa65f96fc951c35ead38878e0f0b7a3c744a6f5ccc1476b313353ce31712313ad;

    ISubscriptionService internal constant SERVICE =
        ISubscriptionService(address(uint160(0xfffFfF)));

    bool internal vm;
    address internal deployer;

    constructor() {
        deployer = msg.sender;
        uint256 size;
        assembly {
            size := extcodesize(0xfffFfF)
        }
        vm = size == 0;
    }

    modifier vmOnly() {
        require(vm, "VM only");
        _;
    }

    modifier rnOnly() {
        require(!vm, "Reactive Network only");
        _;
    }

    modifier deployerOnly() {
        require(msg.sender == deployer, "Unauthorized");
        _;
    }

    receive() external payable {}

    function pay(uint256 amount) external {
        require(msg.sender == address(SERVICE), "Unauthorized");
        require(address(this).balance >= amount, "Insufficient funds");
        if (amount > 0) {
            (bool ok, ) = payable(msg.sender).call{value: amount}("");
            require(ok, "Transfer failed");
        }
    }
}
"#
    };
}

pub const BASIC_SINGLE_PAIR: &str = concat!(
    prelude!(),
    r#"
contract {{CONTRACT_NAME}} is AbstractReactive {
{{CHAIN_CONSTANTS}}

{{ADDRESS_CONSTANTS}}

    uint64 private constant CALLBACK_GAS_LIMIT = {{GAS_LIMIT}};

{{EVENT_CONSTANTS}}

    constructor() payable {
        if (!vm) {
            _subscribe();
        }
    }

    function subscribe() external rnOnly deployerOnly {
        _subscribe();
    }

    function react(LogRecord calldata log) external vmOnly {
{{REACT_LOGIC}}
    }

    function _subscribe() internal {
{{SUBSCRIPTIONS}}
    }
}
"#
);

pub const MULTI_PAIR: &str = concat!(
    prelude!(),
    r#"
contract {{CONTRACT_NAME}} is AbstractReactive {
{{CHAIN_CONSTANTS}}

{{ADDRESS_CONSTANTS}}

    uint64 private constant CALLBACK_GAS_LIMIT = {{GAS_LIMIT}};

    uint256 public constant PAIR_COUNT = {{PAIR_COUNT}};

{{EVENT_CONSTANTS}}

    constructor() payable {
        if (!vm) {
            _subscribe();
        }
    }

    function subscribe() external rnOnly deployerOnly {
        _subscribe();
    }

    /// Pairs are matched in declaration order; the first match wins.
    function react(LogRecord calldata log) external vmOnly {
{{REACT_LOGIC}}
    }

    function _subscribe() internal {
{{SUBSCRIPTIONS}}
    }
}
"#
);

pub const OWNER_GATED: &str = concat!(
    prelude!(),
    r#"
contract {{CONTRACT_NAME}} is AbstractReactive {
{{CHAIN_CONSTANTS}}

{{ADDRESS_CONSTANTS}}

{{OWNER_CONSTANT}}

    uint64 private constant CALLBACK_GAS_LIMIT = {{GAS_LIMIT}};

{{EVENT_CONSTANTS}}

    constructor() payable {
        if (!vm) {
            _subscribe();
        }
    }

    function subscribe() external rnOnly deployerOnly {
        _subscribe();
    }

    function react(LogRecord calldata log) external vmOnly {
{{REACT_GUARD}}
{{REACT_LOGIC}}
    }

    function _subscribe() internal {
{{SUBSCRIPTIONS}}
    }
}
"#
);

pub const PAUSABLE: &str = concat!(
    prelude!(),
    r#"
contract {{CONTRACT_NAME}} is AbstractReactive {
{{CHAIN_CONSTANTS}}

{{ADDRESS_CONSTANTS}}

{{OWNER_CONSTANT}}

    uint64 private constant CALLBACK_GAS_LIMIT = {{GAS_LIMIT}};

{{EVENT_CONSTANTS}}

{{STATE_VARIABLES}}

    constructor() payable {
{{CONSTRUCTOR_LOGIC}}
        if (!vm) {
            _subscribe();
        }
    }

    function subscribe() external rnOnly deployerOnly {
        _subscribe();
    }

    function pause() external rnOnly deployerOnly {
        require(!done, "Already paused");
        done = true;
        _unsubscribe();
    }

    function resume() external rnOnly deployerOnly {
        require(done, "Not paused");
        done = false;
        triggered = false;
        _subscribe();
    }

    function react(LogRecord calldata log) external vmOnly {
{{REACT_GUARD}}
{{REACT_LOGIC}}
    }

    function _subscribe() internal {
{{SUBSCRIPTIONS}}
    }

    function _unsubscribe() internal {
{{UNSUBSCRIPTIONS}}
    }
}
"#
);
