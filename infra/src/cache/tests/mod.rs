mod sweeper_tests;
